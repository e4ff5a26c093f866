use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use crossterm::style::Stylize;
use unicode_width::UnicodeWidthStr;

pub fn get_styles() -> Styles {
    let heading = Style::new()
        .bold()
        .underline()
        .fg_color(Some(Color::Ansi(AnsiColor::Yellow)));
    let good = Style::new()
        .bold()
        .fg_color(Some(Color::Ansi(AnsiColor::Green)));
    let bad = Style::new()
        .bold()
        .fg_color(Some(Color::Ansi(AnsiColor::Red)));

    Styles::styled()
        .usage(heading)
        .header(heading)
        .literal(good)
        .valid(good)
        .invalid(bad)
        .error(bad)
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

mod colors {
    use crossterm::style::Color;

    pub const GOLD: Color = Color::Rgb {
        r: 212,
        g: 175,
        b: 55,
    };
    pub const GREEN: Color = Color::Rgb {
        r: 0,
        g: 200,
        b: 120,
    };
    pub const RED: Color = Color::Rgb {
        r: 230,
        g: 80,
        b: 80,
    };
    pub const ORANGE: Color = Color::Rgb {
        r: 255,
        g: 165,
        b: 0,
    };
    pub const DIM: Color = Color::Rgb {
        r: 128,
        g: 128,
        b: 128,
    };
}

pub fn print_success(message: &str) {
    println!(" {} {}", "✓".with(colors::GREEN).bold(), message.with(colors::GREEN));
}

pub fn print_error(message: &str) {
    println!(" {} {}", "✗".with(colors::RED).bold(), message.with(colors::RED));
}

pub fn print_warning(message: &str) {
    println!(" {} {}", "⚠".with(colors::ORANGE).bold(), message.with(colors::ORANGE));
}

pub fn print_key_value(key: &str, value: &str) {
    println!(
        "  {} {} {}",
        "♪".with(colors::GOLD),
        format!("{}:", key).with(colors::DIM),
        value
    );
}

pub fn print_empty_list(message: &str) {
    println!("  {}", message.with(colors::DIM).italic());
}

/// Plain column layout, padded by display width so decomposed characters
/// line up.
pub struct Columns {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Columns {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.width()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.width());
            }
        }
        widths
    }

    pub fn print(&self) {
        let widths = self.widths();
        let header: Vec<String> = self
            .headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| pad(h, *w))
            .collect();
        println!("  {}", header.join("  ").with(colors::GOLD).bold());

        for row in &self.rows {
            let cells: Vec<String> = row.iter().zip(&widths).map(|(c, w)| pad(c, *w)).collect();
            println!("  {}", cells.join("  "));
        }
    }
}

fn pad(cell: &str, width: usize) -> String {
    format!("{}{}", cell, " ".repeat(width.saturating_sub(cell.width())))
}
