use crate::languages::LanguageTable;
use crate::types::LanguageTally;
use std::io::IsTerminal;

pub fn format(languages: &LanguageTally, table: &LanguageTable) -> String {
    let colors = Colors::enabled();
    let total: usize = languages.values().sum();

    let lang_w = languages
        .keys()
        .map(|s| s.chars().count())
        .chain(std::iter::once("Language".len()))
        .max()
        .unwrap_or(12)
        .max(12);
    let files_w = languages
        .values()
        .chain(std::iter::once(&total))
        .map(|&n| format_num(n).len())
        .max()
        .unwrap_or(8)
        .max(8);
    let share_w: usize = 8;
    let color_w: usize = 9;

    let gutter: usize = 6;
    let sep = " ".repeat(gutter);

    let widths = ColWidths {
        lang: lang_w,
        files: files_w,
        share: share_w,
        color: color_w,
    };

    let header_plain = [
        format!("{:<w$}", "Language", w = widths.lang),
        format!("{:>w$}", "files", w = widths.files),
        format!("{:>w$}", "share", w = widths.share),
        format!("{:<w$}", "color", w = widths.color),
    ]
    .join(&sep);
    let header = colors.bold(header_plain.trim_end());

    let separator = "-".repeat(widths.lang + widths.files + widths.share + widths.color + gutter * 3);

    let mut lines = Vec::new();
    lines.push(header);
    lines.push(separator.clone());

    for (lang, &count) in languages {
        let swatch = table.color_for(lang).unwrap_or("");
        lines.push(format_row(lang, count, total, swatch, &widths, &colors, &sep));
    }

    lines.push(separator);
    lines.push(format_row("Total", total, total, "", &widths, &colors, &sep));

    lines.join("\n")
}

struct ColWidths {
    lang: usize,
    files: usize,
    share: usize,
    color: usize,
}

fn format_row(
    lang: &str,
    count: usize,
    total: usize,
    hex: &str,
    w: &ColWidths,
    colors: &Colors,
    sep: &str,
) -> String {
    let name_plain = format!("{:<w$}", lang, w = w.lang);
    let files_plain = format!("{:>w$}", format_num(count), w = w.files);
    let share_plain = format!("{:>w$}", format_share(count, total), w = w.share);
    let color_plain = format!("{:<w$}", hex, w = w.color);

    let name_col = if lang == "Total" {
        colors.paint(&name_plain, "1;97")
    } else {
        match parse_hex(hex) {
            Some((r, g, b)) => colors.paint(&name_plain, &format!("38;2;{r};{g};{b}")),
            None => colors.paint(&name_plain, hue_code(stable_hash_color(lang))),
        }
    };
    let files_col = colors.paint(&files_plain, "94");
    let share_col = colors.paint(&share_plain, "36");
    let color_col = colors.paint(&color_plain, "90");

    [name_col, files_col, share_col, color_col]
        .join(sep)
        .trim_end()
        .to_string()
}

fn format_num(n: usize) -> String {
    let s = n.to_string();
    let mut out = String::with_capacity(s.len() + s.len() / 3);
    for (i, ch) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[allow(clippy::cast_precision_loss)]
fn format_share(count: usize, total: usize) -> String {
    if total == 0 {
        return "-".to_string();
    }
    format!("{:.1}%", count as f64 * 100.0 / total as f64)
}

/// `#b07219` or `#555` to an RGB triple.
fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        3 => {
            let c = |i: usize| channel(&hex[i..=i]).map(|v| v * 17);
            Some((c(0)?, c(1)?, c(2)?))
        }
        _ => None,
    }
}

fn stable_hash_color(s: &str) -> u8 {
    let mut h: u32 = 0xcbf2_9ce4;
    for b in s.as_bytes() {
        h ^= u32::from(*b);
        h = h.wrapping_mul(0x0100_0193);
    }
    (h % 6) as u8
}

fn hue_code(idx: u8) -> &'static str {
    match idx {
        0 => "92",
        1 => "96",
        2 => "93",
        3 => "95",
        4 => "94",
        _ => "91",
    }
}

struct Colors {
    enabled: bool,
}

impl Colors {
    fn enabled() -> Self {
        let force = std::env::var("CLICOLOR_FORCE")
            .ok()
            .filter(|v| v != "0")
            .is_some();
        let no_color = std::env::var_os("NO_COLOR").is_some();
        let clicolor_zero = std::env::var("CLICOLOR")
            .ok()
            .is_some_and(|v| v == "0");
        let term = std::io::stdout().is_terminal();
        let enabled = if force {
            true
        } else if no_color || clicolor_zero {
            false
        } else {
            term
        };
        Colors { enabled }
    }

    fn paint(&self, s: &str, code: &str) -> String {
        if self.enabled {
            format!("\x1b[{code}m{s}\x1b[0m")
        } else {
            s.to_string()
        }
    }

    fn bold(&self, s: &str) -> String {
        if self.enabled {
            format!("\x1b[1m{s}\x1b[0m")
        } else {
            s.to_string()
        }
    }
}
