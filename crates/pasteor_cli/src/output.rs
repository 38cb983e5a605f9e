//! Output formatting for one-shot commands.

use pasteor_core::models::{
    AggregateStats, ListResult, Paste, PasteMetadata, PasteSummary, PublicStats,
};

fn short_date(summary: &PasteSummary) -> String {
    summary.created_at.format("%Y-%m-%d %H:%M").to_string()
}

pub fn format_summary_rows(items: &[PasteSummary]) -> String {
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let author = item
            .author
            .as_ref()
            .map(|author| author.name.as_str())
            .unwrap_or("Anonymous");
        rows.push(format!(
            "{:<12} {:<30} {:<12} {:>6}  {}  {}",
            item.id,
            item.title_or_untitled(),
            item.language,
            item.views,
            short_date(item),
            author,
        ));
    }
    rows.join("\n")
}

pub fn format_list(result: &ListResult) -> String {
    if result.items.is_empty() {
        return format!(
            "No pastes on page {} (of {} total)",
            result.page, result.total_count
        );
    }
    format!(
        "{}\nPage {} of {} ({} pastes)",
        format_summary_rows(&result.items),
        result.page,
        result.total_pages.max(1),
        result.total_count,
    )
}

pub fn format_created(meta: &PasteMetadata) -> String {
    match &meta.url {
        Some(url) => format!("Created paste {} -> {}", meta.id, url),
        None => format!("Created paste {}", meta.id),
    }
}

pub fn format_paste(paste: &Paste) -> String {
    let mut header = format!(
        "{} [{}] - {} views",
        paste.title_or_untitled(),
        paste.language,
        paste.views,
    );
    if let Some(author) = &paste.author {
        header.push_str(&format!(" - by {}", author.name));
    }
    if let Some(expires_at) = paste.expires_at {
        header.push_str(&format!(
            " - expires {}",
            expires_at.format("%Y-%m-%d %H:%M")
        ));
    }
    format!("{header}\n\n{}", paste.content)
}

pub fn format_user_stats(stats: &AggregateStats) -> String {
    let mut lines = vec![
        format!("Total pastes:  {}", stats.total_pastes),
        format!("Total views:   {}", stats.total_views),
        format!("Active pastes: {}", stats.active_pastes),
    ];
    if let Some(id) = &stats.most_viewed_paste {
        lines.push(format!("Most viewed:   {id}"));
    }
    lines.join("\n")
}

pub fn format_public_stats(stats: &PublicStats) -> String {
    let mut lines = vec![
        format!("Total pastes: {}", stats.total_pastes),
        format!("Total views:  {}", stats.total_views),
    ];
    if !stats.top_languages.is_empty() {
        let top: Vec<String> = stats
            .top_languages
            .iter()
            .map(|entry| format!("{} ({})", entry.language, entry.count))
            .collect();
        lines.push(format!("Top languages: {}", top.join(", ")));
    }
    lines.join("\n")
}
