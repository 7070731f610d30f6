use std::fmt::Display;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, DimensionSelector, RangeSelector};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel. Any change triggers a full refresh.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let color_map = state.color_map.as_ref();
            changed |= dimension_filter(ui, &mut state.stores, |store| {
                color_map.map(|cm| cm.color_for(store))
            });
            ui.separator();
            changed |= dimension_filter(ui, &mut state.regions, |_| None);
            ui.separator();
            changed |= dimension_filter(ui, &mut state.statuses, |_| None);
            ui.separator();
            changed |= dimension_filter(ui, &mut state.years, |_| None);
            ui.separator();
            changed |= range_filter(ui, &mut state.length);
        });

    if changed {
        state.refresh();
    }
}

/// "Select all" checkbox, otherwise a multi-select list over the sorted domain.
fn dimension_filter<T, F>(ui: &mut Ui, selector: &mut DimensionSelector<T>, color: F) -> bool
where
    T: Ord + Clone + Display,
    F: Fn(&T) -> Option<Color32>,
{
    let mut changed = false;
    let label = selector.label;

    ui.strong(label);
    changed |= ui
        .checkbox(&mut selector.select_all, format!("Select all {}", label.to_lowercase()))
        .changed();

    if selector.select_all {
        ui.weak(format!("{} selected", selector.domain().len()));
        return changed;
    }

    let n_picked = selector.picks().len();
    let n_total = selector.domain().len();
    let header_text = format!("Choose {}  ({n_picked}/{n_total})", label.to_lowercase());

    egui::CollapsingHeader::new(header_text)
        .id_salt(label)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if ui.small_button("Clear").clicked() && n_picked > 0 {
                selector.clear_picks();
                changed = true;
            }

            // Clone so toggling inside the loop doesn't alias the domain.
            let domain = selector.domain().to_vec();
            for value in &domain {
                let mut text = RichText::new(value.to_string());
                if let Some(c) = color(value) {
                    text = text.color(c);
                }
                let mut checked = selector.is_picked(value);
                if ui.checkbox(&mut checked, text).changed() {
                    selector.toggle(value);
                    changed = true;
                }
            }
        });

    if n_picked > 0 {
        let picked: Vec<String> = selector.picks().iter().map(|v| v.to_string()).collect();
        ui.label(RichText::new(picked.join(", ")).small());
    }

    changed
}

/// Two sliders bounding the description length, both inclusive.
fn range_filter(ui: &mut Ui, range: &mut RangeSelector) -> bool {
    ui.strong("Description length");

    let mut lo = range.lo();
    let mut hi = range.hi();
    let lo_changed = ui
        .add(egui::Slider::new(&mut lo, range.min..=range.max).text("min"))
        .changed();
    let hi_changed = ui
        .add(egui::Slider::new(&mut hi, range.min..=range.max).text("max"))
        .changed();

    if lo_changed {
        range.set_lo(lo);
    }
    if hi_changed {
        range.set_hi(hi);
    }
    lo_changed || hi_changed
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} complaints loaded, {} matching",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

/// Load another dataset. On failure the current one stays and the error is shown.
pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open complaints data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => state.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
