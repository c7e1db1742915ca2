/// Undo/Redo Example
///
/// This example demonstrates:
/// - Every edit, including a batch, is one undo step
/// - Redo is discarded by a new edit
/// - Saved-state tracking with `mark_saved` / `is_modified`
/// - A cell evaluator that reports bad values without rejecting them

use tabledit::{EvalError, Table, TableConfig};

fn main() {
    println!("=== tabledit Undo/Redo Example ===\n");

    let mut table = Table::with_config(TableConfig::new().with_history_limit(50));
    table.add_cols(&["item", "price"]);
    table.add_rows(3);
    table
        .set_cells(&[(0, "item", "bolt"), (1, "item", "nut"), (2, "item", "washer")])
        .unwrap();
    table.mark_saved();
    println!("1. Starting table (saved):\n{}\n", table);

    // Evaluator: prices must parse as numbers
    table.set_evaluator(|_row: usize, column: &str, value: &str| {
        if column == "price" && !value.is_empty() && value.parse::<f64>().is_err() {
            return Err(EvalError::new(format!("'{}' is not a number", value)));
        }
        Ok(())
    });

    println!("2. Pricing items in one batch...");
    table
        .set_cells(&[(0, "price", "0.10"), (1, "price", "0.05"), (2, "price", "cheap")])
        .unwrap();
    println!("   Undo steps: {}", table.undo_len());
    println!("   Modified: {}", table.is_modified());
    if let Some(err) = table.evaluation_error(2, "price").unwrap() {
        println!("   Row 2 price: {}", err);
    }
    println!();

    println!("3. Deleting the first two rows...");
    table.delete_rows(&[0, 1]).unwrap();
    println!("{}\n", table);

    println!("4. Undo twice...");
    table.undo();
    table.undo();
    println!("{}", table);
    println!("   Modified: {}\n", table.is_modified());

    println!("5. Redo once, then edit: the remaining redo step is discarded");
    table.redo();
    table.set(0, "price", "0.12").unwrap();
    println!("   Can redo: {}", table.can_redo());
    println!("{}", table);

    println!("\n=== Example Complete ===");
}
