//! Table and JSON rendering of catalog records.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use serde::Serialize;

use marquee_core::models::{Actor, Genre, Movie, MovieStats, Review};

use crate::utils::{format_date, format_optional, truncate_string};

/// Widest a table cell may get before it is truncated
const MAX_CELL_WIDTH: usize = 40;

/// Width of the per-genre bar on the dashboard
const BAR_WIDTH: usize = 20;

/// A record that can be shown as one table row.
pub trait TableRow {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

impl TableRow for Genre {
    const HEADERS: &'static [&'static str] = &["ID", "NAME"];

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone()]
    }
}

impl TableRow for Actor {
    const HEADERS: &'static [&'static str] = &["ID", "NAME", "BIRTHDAY", "AGE", "NATIONALITY"];

    fn cells(&self) -> Vec<String> {
        actor_cells(self, Local::now().date_naive())
    }
}

fn actor_cells(actor: &Actor, today: NaiveDate) -> Vec<String> {
    vec![
        actor.id.to_string(),
        actor.name.clone(),
        format_date(actor.birthday),
        format_optional(actor.age_on(today).map(|a| a.to_string()).as_deref()),
        format_optional(actor.nationality.map(|n| n.to_string()).as_deref()),
    ]
}

impl TableRow for Movie {
    const HEADERS: &'static [&'static str] = &["ID", "TITLE", "GENRE", "RELEASED", "RATE", "ACTORS"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            self.genre.name.clone(),
            format_date(self.release_date),
            self.rate
                .map(|r| format!("{:.1}", r))
                .unwrap_or_else(|| format_optional(None)),
            format_optional(Some(self.actor_names().join(", ").as_str())),
        ]
    }
}

impl TableRow for Review {
    const HEADERS: &'static [&'static str] = &["ID", "MOVIE", "STARS", "COMMENT"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.movie.to_string(),
            self.star_display(),
            format_optional(self.comment.as_deref()),
        ]
    }
}

/// Lay out rows under their headers with space-padded columns.
pub fn render_table<R: TableRow>(rows: &[R]) -> String {
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            r.cells()
                .iter()
                .map(|c| truncate_string(c, MAX_CELL_WIDTH))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = R::HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header: Vec<String> = R::HEADERS.iter().map(|h| h.to_string()).collect();
    std::iter::once(&header)
        .chain(body.iter())
        .map(|row| {
            row.iter()
                .zip(&widths)
                .map(|(cell, width)| {
                    let pad = width.saturating_sub(cell.chars().count());
                    format!("{}{}", cell, " ".repeat(pad))
                })
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn print_list<R: TableRow + Serialize>(rows: &[R], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
    } else if rows.is_empty() {
        println!("No records found");
    } else {
        println!("{}", render_table(rows));
    }
    Ok(())
}

pub fn print_item<R: TableRow + Serialize>(item: &R, json: bool) -> Result<()> {
    print_list(std::slice::from_ref(item), json)
}

/// Dashboard summary: totals, average rating, share of movies per genre.
pub fn render_stats(stats: &MovieStats) -> String {
    let mut lines = vec![
        format!("Movies:        {}", stats.total_movies),
        format!("Reviews:       {}", stats.total_reviews),
        format!("Average stars: {:.1}", stats.average_stars.unwrap_or(0.0)),
    ];

    if !stats.movies_by_genre.is_empty() {
        let name_width = stats
            .movies_by_genre
            .iter()
            .map(|g| g.genre_name.chars().count())
            .max()
            .unwrap_or(0);
        lines.push(String::new());
        lines.push("Movies by genre".to_string());
        for entry in &stats.movies_by_genre {
            let share = stats.genre_share(entry);
            let filled = ((share / 100.0) * BAR_WIDTH as f64).round() as usize;
            let filled = filled.min(BAR_WIDTH);
            let pad = name_width - entry.genre_name.chars().count();
            lines.push(format!(
                "  {}{}  {}{}  {} ({:.0}%)",
                entry.genre_name,
                " ".repeat(pad),
                "█".repeat(filled),
                "░".repeat(BAR_WIDTH - filled),
                entry.count,
                share
            ));
        }
    }
    lines.join("\n")
}
