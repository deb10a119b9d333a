use crate::controller::ScreenState;
use crate::model::{AnalysisResult, Recipe};
use crate::notify::{Notice, Notifier};
use log::warn;
use std::fmt::Write;

pub const NO_ITEMS_MESSAGE: &str = "No items found on the receipt.";
pub const NO_RECIPES_MESSAGE: &str = "No recipes could be generated from the receipt items.";

/// Render the screen state as plain text
pub fn render(state: &ScreenState) -> String {
    let mut out = String::new();

    match (&state.image, &state.result) {
        (None, _) => {
            out.push_str("Upload your receipt to discover recipes\n");
        }
        (Some(image), None) => {
            let _ = writeln!(out, "Receipt: {} ({})", image.locator, image.mime_type.as_str());
            if state.analyzing {
                out.push_str("Analyzing your receipt and finding recipes...\n");
            } else {
                out.push_str("Ready to analyze.\n");
            }
        }
        (Some(image), Some(result)) => {
            let _ = writeln!(out, "Receipt: {}", image.locator);
            if state.analyzing {
                out.push_str("Analyzing your receipt and finding recipes...\n");
            } else {
                render_result(&mut out, result);
            }
        }
    }

    out
}

fn render_result(out: &mut String, result: &AnalysisResult) {
    if let Some(error) = &result.error_message {
        let _ = writeln!(out, "\nAnalysis Error: {}", error);
    }

    out.push_str("\nItems Found\n");
    if result.items.is_empty() {
        let _ = writeln!(out, "  {}", NO_ITEMS_MESSAGE);
    } else {
        let _ = writeln!(out, "  {}", tags(&result.items));
    }

    out.push_str("\nRecipe Suggestions\n");
    if result.recipes.is_empty() {
        let _ = writeln!(out, "  {}", NO_RECIPES_MESSAGE);
    } else {
        for recipe in &result.recipes {
            render_recipe(out, recipe);
        }
    }
}

fn render_recipe(out: &mut String, recipe: &Recipe) {
    let _ = writeln!(out, "\n  {}", recipe.name);
    if !recipe.ingredients.is_empty() {
        let _ = writeln!(out, "    Ingredients: {}", tags(&recipe.ingredients));
    }
    if !recipe.instructions.is_empty() {
        let _ = writeln!(out, "    Instructions: {}", recipe.instructions);
    }
    if !recipe.used_items.is_empty() {
        let _ = writeln!(out, "    Uses from receipt: {}", tags(&recipe.used_items));
    }
}

fn tags(values: &[String]) -> String {
    values
        .iter()
        .map(|value| format!("[{}]", value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Notifier for terminals: notices go to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        warn!("{:?} notice: {}", notice.kind, notice.message);
        eprintln!("{}: {}", notice.title, notice.message);
    }
}
