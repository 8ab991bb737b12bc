//! Output format helpers for CLI commands.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use clap::{ArgAction, Args, ValueEnum};
use foodify_domain::{CartItem, Category, NutritionFacts, ProductSummary};
use foodify_shared::ErrorEnvelope;
use serde::Serialize;
use std::fmt::Write;

/// Output format choices for CLI responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-friendly text output.
    #[default]
    Text,
    /// Machine-friendly JSON output.
    Json,
}

/// Output-related CLI flags.
#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Output format for command responses.
    #[arg(long, global = true, value_enum, default_value_t)]
    pub output: OutputFormat,
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Output mode derived from CLI flags.
#[derive(Debug, Clone, Copy)]
pub struct OutputMode {
    pub format: OutputFormat,
    pub verbose: u8,
}

impl OutputMode {
    #[must_use]
    pub const fn from_args(args: &OutputArgs) -> Self {
        Self {
            format: args.output,
            verbose: args.verbose,
        }
    }

    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }
}

/// Successful output: pretty JSON of `payload` or the prepared text.
pub fn success<T: Serialize>(
    mode: OutputMode,
    payload: &T,
    text: impl FnOnce() -> String,
) -> Result<CliOutput, CliError> {
    let stdout = if mode.is_json() {
        let value = serde_json::json!({ "status": "ok", "data": payload });
        let mut out = serde_json::to_string_pretty(&value)?;
        out.push('\n');
        out
    } else {
        text()
    };
    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}

/// Failed operation rendered for the active mode.
pub fn failure(mode: OutputMode, error: &ErrorEnvelope) -> CliOutput {
    let exit_code = ExitCode::for_envelope(error);
    if mode.is_json() {
        let payload = serde_json::json!({ "status": "error", "error": error });
        let mut stdout = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| {
            "{\"status\":\"error\",\"error\":{\"code\":\"core:internal\",\"message\":\"internal error\"}}"
                .to_string()
        });
        stdout.push('\n');
        CliOutput {
            stdout,
            stderr: String::new(),
            exit_code,
        }
    } else {
        CliOutput {
            stdout: String::new(),
            stderr: format!("error: {} ({})\n", error.message, error.code),
            exit_code,
        }
    }
}

/// One line per product: id, grade, name and brand.
pub fn product_lines(products: &[ProductSummary]) -> String {
    let mut out = String::new();
    for product in products {
        let grade = product.grade.map_or('-', |grade| grade.letter());
        let _ = write!(out, "{:<14} [{grade}] {}", product.id, product.display_name());
        if let Some(brand) = product.primary_brand() {
            let _ = write!(out, " ({brand})");
        }
        out.push('\n');
    }
    out
}

/// Detail block for a single product.
pub fn product_details(product: &ProductSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", product.display_name());
    let _ = writeln!(out, "  id:     {}", product.id);
    if let Some(brand) = product.primary_brand() {
        let _ = writeln!(out, "  brand:  {brand}");
    }
    let grade = product
        .grade
        .map_or_else(|| "unknown".to_string(), |grade| grade.to_string());
    let _ = writeln!(out, "  grade:  {grade}");
    if let Some(url) = product.image_url.as_deref() {
        let _ = writeln!(out, "  image:  {url}");
    }
    if !product.categories.is_empty() {
        let _ = writeln!(out, "  categories: {}", product.categories.join(", "));
    }
    let _ = writeln!(out, "  ingredients: {}", product.ingredients_text());
    if let Some(facts) = product.nutrition.as_ref() {
        out.push_str("  per 100 g:\n");
        nutrition_lines(&mut out, facts);
    }
    out
}

fn nutrition_lines(out: &mut String, facts: &NutritionFacts) {
    let rows = [
        ("energy (kJ)", facts.energy_kj),
        ("energy (kcal)", facts.energy_kcal),
        ("fat (g)", facts.fat_g),
        ("carbohydrates (g)", facts.carbohydrates_g),
        ("proteins (g)", facts.proteins_g),
        ("salt (g)", facts.salt_g),
    ];
    for (label, value) in rows {
        if let Some(value) = value {
            let _ = writeln!(out, "    {label:<18} {value}");
        }
    }
}

/// Category table.
pub fn category_lines(categories: &[Category]) -> String {
    let mut out = String::new();
    for category in categories {
        let _ = writeln!(
            out,
            "{:<40} {:>9}  {}",
            category.id.as_str(),
            category.products,
            category.name
        );
    }
    out
}

/// Cart table with a total line.
pub fn cart_lines(items: &[CartItem], total: u64) -> String {
    if items.is_empty() {
        return "cart is empty\n".to_string();
    }
    let mut out = String::new();
    for item in items {
        let _ = write!(out, "{:>3} x {:<14} {}", item.quantity, item.id, item.name);
        if let Some(brand) = item.brand.as_deref() {
            let _ = write!(out, " ({brand})");
        }
        out.push('\n');
    }
    let _ = writeln!(out, "total items: {total}");
    out
}
