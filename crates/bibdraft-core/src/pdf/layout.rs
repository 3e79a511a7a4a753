use super::TextRun;

/// Concatenate runs, starting a new line wherever a run's baseline differs
/// from the previous run's.
pub fn page_text(runs: &[TextRun]) -> String {
    let mut text = String::new();
    let mut last_baseline: Option<f32> = None;

    for run in runs {
        if let Some(prev) = last_baseline
            && prev != run.baseline
        {
            text.push('\n');
        }
        text.push_str(&run.text);
        last_baseline = Some(run.baseline);
    }

    text
}

/// The text set in the page's largest type, used as a title guess.
///
/// Runs are grouped by exact height and empty runs are skipped when a group
/// is joined, so a tallest group holding only empty runs gives `""`. The
/// tallest group, joined with spaces, wins unless it is a single character (page
/// numbers and decorative initials are often the tallest glyphs), in which
/// case the next-tallest group is used.
pub fn dominant_text(runs: &[TextRun]) -> String {
    let mut groups: Vec<(f32, Vec<&str>)> = Vec::new();

    for run in runs {
        match groups.iter_mut().find(|(h, _)| *h == run.height) {
            Some((_, texts)) => texts.push(&run.text),
            None => groups.push((run.height, vec![run.text.as_str()])),
        }
    }

    groups.sort_by(|a, b| b.0.total_cmp(&a.0));

    let joined = |idx: usize| {
        groups
            .get(idx)
            .map(|(_, texts)| {
                texts
                    .iter()
                    .copied()
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
    };

    let primary = joined(0);
    if primary.chars().count() == 1 {
        joined(1)
    } else {
        primary
    }
}
