//! Plain-text rendering of published views for the terminal.

use roster_core::{DataResult, DetailsState, User, UserDetails};
use roster_engine::ListView;

pub fn list_lines(view: &ListView<User>) -> Vec<String> {
    match view {
        DataResult::Empty => vec!["[list] no users".to_string()],
        DataResult::Pending => vec!["[list] loading...".to_string()],
        DataResult::Error(err) => vec![format!("[list] error: {err}")],
        DataResult::Success(items) => {
            let mut lines = vec![format!("[list] {} users", items.len())];
            lines.extend(items.iter().map(|item| {
                let marker = if item.in_progress { "*" } else { " " };
                format!(
                    "  {marker} #{} {} ({})",
                    item.entity.id, item.entity.name, item.entity.company
                )
            }));
            lines
        }
    }
}

pub fn details_lines(state: &DetailsState<UserDetails>) -> Vec<String> {
    let mut lines = match state.details() {
        DataResult::Empty => vec!["[details] idle".to_string()],
        DataResult::Pending => vec!["[details] loading...".to_string()],
        DataResult::Error(err) => vec![format!("[details] error: {err}")],
        DataResult::Success(details) => vec![
            format!("[details] #{} {}", details.user.id, details.user.name),
            format!("  {}", details.details),
        ],
    };
    if state.is_deleting() {
        lines.push("  deleting...".to_string());
    }
    lines
}
