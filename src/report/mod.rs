pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

/// Sample standard deviation (n-1 denominator). Fewer than 2 values yields 0.
pub fn sample_std(values: &[f32]) -> f32 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss = values.iter().map(|v| (v - m) * (v - m)).sum::<f32>();
    (ss / (values.len() - 1) as f32).sqrt()
}

pub fn min_max(values: &[f32]) -> Option<(f32, f32)> {
    let mut iter = values.iter().copied();
    let first = iter.next()?;
    let mut lo = first;
    let mut hi = first;
    for v in iter {
        if v < lo {
            lo = v;
        }
        if v > hi {
            hi = v;
        }
    }
    Some((lo, hi))
}

pub fn format_f32_2(v: f32) -> String {
    format!("{:.2}", v)
}

pub fn format_f32_3(v: f32) -> String {
    format!("{:.3}", v)
}

/// Score cells use 2 decimal places; absent scores stay empty.
pub fn format_opt_score(v: Option<f32>) -> String {
    match v {
        Some(v) => format_f32_2(v),
        None => String::new(),
    }
}

/// Quote a CSV field when it contains the delimiter, a quote, or a newline.
pub fn csv_field(value: &str, delimiter: char) -> String {
    if value.contains(delimiter) || value.contains('"') || value.contains('\n') {
        let mut out = String::with_capacity(value.len() + 2);
        out.push('"');
        for ch in value.chars() {
            if ch == '"' {
                out.push('"');
            }
            out.push(ch);
        }
        out.push('"');
        out
    } else {
        value.to_string()
    }
}
