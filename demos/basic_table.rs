/// Basic Table Operations Example
///
/// This example demonstrates:
/// - Creating a table and adding columns and rows
/// - Reading and writing cells by name and by position
/// - Inserting, duplicating, moving and deleting rows
/// - Exporting to CSV and JSON

use tabledit::Table;

fn main() {
    println!("=== tabledit Basic Table Example ===\n");

    // 1. Create a table with columns
    println!("1. Creating table...");
    let mut users = Table::new();
    users.add_cols(&["id", "name", "email"]);
    println!("   Columns: {:?}\n", users.column_names());

    // 2. Add rows and fill them in one batch
    println!("2. Adding rows...");
    users.add_rows(3);
    users
        .set_cells(&[
            (0, "id", "1"),
            (0, "name", "Alice"),
            (0, "email", "alice@example.com"),
            (1, "id", "2"),
            (1, "name", "Bob"),
            (2, "id", "3"),
            (2, "name", "Charlie"),
            (2, "email", "charlie@example.com"),
        ])
        .unwrap();
    println!("   Added {} rows\n", users.row_count());

    // 3. Query data
    println!("3. Querying data...");
    for i in 0..users.row_count() as i64 {
        let email = users.get(i, "email").unwrap();
        println!(
            "   Row {}: {} - {}",
            i,
            users.get(i, "name").unwrap(),
            if email.is_empty() { "N/A" } else { email }
        );
    }
    println!("   Last row by negative index: {}\n", users.get(-1, "name").unwrap());

    // 4. Update a value by position
    println!("4. Updating value...");
    users.set_at(1, 2, "bob@example.com").unwrap();
    println!("   Bob's email is now {}\n", users.get(1, "email").unwrap());

    // 5. Insert a row in the middle
    println!("5. Inserting row at index 1...");
    users.insert_rows(&[1]).unwrap();
    users.set_cells(&[(1, "id", "4"), (1, "name", "Diana")]).unwrap();
    println!("   Table now has {} rows\n", users.row_count());

    // 6. Duplicate and move
    println!("6. Duplicating Diana and moving the copy to the end...");
    users.duplicate_rows(&[1]).unwrap();
    users.move_row(2, -1).unwrap();
    println!("   Last row: {}\n", users.get(-1, "name").unwrap());

    // 7. Delete rows
    println!("7. Deleting rows 0 and 2...");
    users.delete_rows(&[0, 2]).unwrap();
    println!("   Table now has {} rows\n", users.row_count());

    // 8. Show the table
    println!("8. Final table contents:");
    println!("{}\n", users);

    println!("   As CSV:");
    print!("{}", users.to_csv());
    println!("\n   As JSON:\n   {}", users.to_json().unwrap());

    println!("\n=== Example Complete ===");
}
