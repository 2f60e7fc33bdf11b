use serde_json::Value;

use terminal_size::{terminal_size, Height, Width};

/// Print `val` as an ASCII table when it is a non-empty array.
/// Returns true if a table was printed, false when the caller should fall back to JSON.
pub fn print_table(val: &Value) -> bool {
    let termw = get_terminal_width();
    match render_table(val, termw, true) {
        Some(lines) => {
            for l in lines { println!("{}", l); }
            true
        }
        None => false,
    }
}

/// Render an array of objects (or scalars) as table lines no wider than `maxw`.
pub fn render_table(val: &Value, maxw: usize, color_header: bool) -> Option<Vec<String>> {
    let (cols, rows) = table_from_array(val)?;
    if rows.is_empty() { return None; }

    let mut widths: Vec<usize> = cols.iter().map(|s| visible_len(s).min(maxw)).collect();
    for r in &rows {
        for (i, cell) in r.iter().enumerate().take(cols.len()) {
            let w = visible_len(cell);
            if w > widths[i] { widths[i] = w.min(maxw); }
        }
    }

    let sep = build_separator(&widths);
    let mut out = Vec::with_capacity(rows.len() + 5);
    out.push(fit_line_to_width(&sep, maxw));
    out.push(fit_line_to_width(&build_header(&cols, &widths, color_header), maxw));
    out.push(fit_line_to_width(&sep, maxw));
    for r in &rows {
        out.push(fit_line_to_width(&build_row(r, &widths), maxw));
    }
    out.push(fit_line_to_width(&sep, maxw));
    out.push(format!("rows: {}, cols: {}", rows.len(), cols.len()));
    Some(out)
}

// Objects: union of keys in first-seen order. Scalars: a single "value" column.
fn table_from_array(val: &Value) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    let Value::Array(arr) = val else { return None };
    if arr.is_empty() { return None; }
    if arr.iter().all(|el| el.is_object()) {
        let mut keys: Vec<String> = Vec::new();
        for el in arr {
            if let Value::Object(map) = el {
                for k in map.keys() { if !keys.contains(k) { keys.push(k.clone()); } }
            }
        }
        let rows: Vec<Vec<String>> = arr
            .iter()
            .map(|el| keys.iter().map(|k| el.get(k).map(to_cell_string).unwrap_or_default()).collect())
            .collect();
        return Some((keys, rows));
    }
    let rows: Vec<Vec<String>> = arr.iter().map(|el| vec![to_cell_string(el)]).collect();
    Some((vec!["value".to_string()], rows))
}

fn to_cell_string(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) if items.iter().all(|x| x.is_string()) => {
            items.iter().filter_map(|x| x.as_str()).collect::<Vec<_>>().join(", ")
        }
        // keep nested objects compact
        other => other.to_string(),
    }
}

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('+');
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('|');
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).cloned().unwrap_or_default();
        let text = truncate(&cell, *w);
        let pad = w.saturating_sub(visible_len(&text));
        s.push(' ');
        if is_numeric_like(&cell) {
            s.push_str(&" ".repeat(pad));
            s.push_str(&text);
        } else {
            s.push_str(&text);
            s.push_str(&" ".repeat(pad));
        }
        s.push(' ');
        s.push('|');
    }
    s
}

// Header cells left-aligned, optionally green; padding uses visible width.
fn build_header(cells: &[String], widths: &[usize], color: bool) -> String {
    let mut s = String::new();
    s.push('|');
    for (i, w) in widths.iter().enumerate() {
        let text = truncate(cells.get(i).map(String::as_str).unwrap_or(""), *w);
        let pad = w.saturating_sub(visible_len(&text));
        s.push(' ');
        if color { s.push_str(&format!("\x1b[32m{}\x1b[0m", text)); } else { s.push_str(&text); }
        s.push_str(&" ".repeat(pad));
        s.push(' ');
        s.push('|');
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max { return s.to_string(); }
    if max <= 1 { return "…".to_string(); }
    s.chars().take(max - 1).collect::<String>() + "…"
}

fn is_numeric_like(s: &str) -> bool {
    // crude detection for aligning numbers to right
    let st = s.trim();
    if st.is_empty() { return false; }
    let mut has_digit = false;
    for ch in st.chars() {
        if ch.is_ascii_digit() { has_digit = true; continue; }
        if ".-+eE,_".contains(ch) { continue; }
        return false;
    }
    has_digit
}

fn get_terminal_width() -> usize {
    match terminal_size() {
        Some((Width(w), Height(_))) if w > 4 => (w - 4) as usize,
        _ => 80,
    }
}

// Cut overly wide lines at the right edge, resetting color in case an escape was cut.
fn fit_line_to_width(s: &str, maxw: usize) -> String {
    if visible_len(s) <= maxw { return s.to_string(); }
    let mut out = String::new();
    let mut seen = 0usize;
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            out.push(ch);
            // copy the whole CSI sequence
            while let Some(c) = chars.next() {
                out.push(c);
                if c.is_ascii_alphabetic() { break; }
            }
            continue;
        }
        if seen + 1 >= maxw { break; }
        out.push(ch);
        seen += 1;
    }
    out.push('…');
    out.push_str("\x1b[0m");
    out
}

fn visible_len(s: &str) -> usize {
    // Count visible chars, skipping ANSI CSI sequences
    let mut count = 0;
    let mut in_esc = false;
    for ch in s.chars() {
        if in_esc {
            if ch.is_ascii_alphabetic() { in_esc = false; }
            continue;
        }
        if ch == '\x1b' { in_esc = true; continue; }
        count += 1;
    }
    count
}
