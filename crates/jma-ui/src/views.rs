//! Terminal rendering of the navigation panel and the forecast list.

use std::fmt::Write;

use jma_core::UiConfig;
use jma_weather::ForecastRow;

use crate::state::AppState;

pub const NAVIGATION_HEADER: &str = "地域を選択";
const EXPANDED_MARK: &str = "▼";
const COLLAPSED_MARK: &str = "▶";
const LOADING_TEXT: &str = "読み込み中…";

/// Regions with their offices listed under the expanded ones
pub fn navigation(state: &AppState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", NAVIGATION_HEADER);

    for region in state.index().regions() {
        let expanded = state.is_expanded(&region.code);
        let mark = if expanded { EXPANDED_MARK } else { COLLAPSED_MARK };
        let _ = writeln!(out, "{} {} ({})", mark, region.name, region.code);

        if !expanded {
            continue;
        }
        for office in &region.offices {
            let selected = state.selected() == Some(office.code.as_str());
            let _ = writeln!(
                out,
                "  {} {} [{}]",
                if selected { "*" } else { " " },
                office.name,
                office.code
            );
        }
    }
    out
}

/// Title label, divider and one line per forecast row
pub fn forecast(state: &AppState, ui: &UiConfig) -> String {
    let mut out = String::new();

    if state.selected().is_none() {
        return out;
    }

    let title = if state.title().is_empty() && state.is_loading() {
        LOADING_TEXT
    } else {
        state.title()
    };
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "─".repeat(ui.divider_width as usize));

    for row in state.rows() {
        let _ = writeln!(out, "{}", forecast_row(row, ui.show_temperatures));
    }
    out
}

fn forecast_row(row: &ForecastRow, show_temperatures: bool) -> String {
    if show_temperatures {
        format!(
            "{:<8}{}  最低 {} / 最高 {}",
            row.date, row.weather, row.min_temp, row.max_temp
        )
    } else {
        format!("{:<8}{}", row.date, row.weather)
    }
}

/// Full screen: application title, navigation, then the forecast
pub fn screen(state: &AppState, ui: &UiConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", ui.title);
    let _ = writeln!(out);
    out.push_str(&navigation(state));
    let _ = writeln!(out);
    out.push_str(&forecast(state, ui));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use jma_weather::{build_region_index, AreaDocument, Forecast};

    fn state() -> AppState {
        let doc: AreaDocument = serde_json::from_str(
            r#"{
                "centers": {"A": {"name": "North"}, "B": {"name": "South"}},
                "offices": {"x": {"name": "Tokyo", "parent": "A"}}
            }"#,
        )
        .unwrap();
        AppState::new(build_region_index(&doc))
    }

    fn loaded(state: &mut AppState) {
        let generation = state.select_office("x");
        state.apply::<String>(
            generation,
            Ok(Forecast {
                office_code: "x".into(),
                publishing_office: "気象庁".into(),
                rows: vec![ForecastRow {
                    date: "05/03".into(),
                    weather: "晴れ".into(),
                    min_temp: "-".into(),
                    max_temp: "25".into(),
                }],
            }),
        );
    }

    #[test]
    fn test_navigation_collapsed_by_default() {
        let nav = navigation(&state());
        assert!(nav.starts_with(NAVIGATION_HEADER));
        assert!(nav.contains("▶ North (A)"));
        assert!(nav.contains("▶ South (B)"));
        assert!(!nav.contains("Tokyo"));
    }

    #[test]
    fn test_navigation_expanded_marks_selection() {
        let mut state = state();
        state.toggle_region("A");
        state.select_office("x");

        let nav = navigation(&state);
        assert!(nav.contains("▼ North (A)"));
        assert!(nav.contains("  * Tokyo [x]"));
    }

    #[test]
    fn test_forecast_hides_temperatures_by_default() {
        let mut state = state();
        loaded(&mut state);

        let text = forecast(&state, &UiConfig::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "気象庁");
        assert_eq!(lines[2], "05/03   晴れ");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_forecast_with_temperatures() {
        let mut state = state();
        loaded(&mut state);

        let ui = UiConfig {
            show_temperatures: true,
            ..UiConfig::default()
        };
        let text = forecast(&state, &ui);
        assert!(text.contains("最低 - / 最高 25"));
    }

    #[test]
    fn test_forecast_blank_without_selection() {
        assert!(forecast(&state(), &UiConfig::default()).is_empty());
    }

    #[test]
    fn test_forecast_shows_loading_while_fetching() {
        let mut state = state();
        state.select_office("x");
        let text = forecast(&state, &UiConfig::default());
        assert!(text.starts_with(LOADING_TEXT));
    }

    #[test]
    fn test_screen_contains_all_parts() {
        let mut state = state();
        loaded(&mut state);
        let text = screen(&state, &UiConfig::default());
        assert!(text.starts_with("気象庁 天気予報アプリ"));
        assert!(text.contains(NAVIGATION_HEADER));
        assert!(text.contains("05/03"));
    }
}
