//! Building tables programmatically with the one-shot builder and the
//! `dex!` macro.
//!
//! Run with: `cargo run --example builder`

use dex::{dex, Table};

fn main() {
    let character = Table::builder_tagged("vocaloid")
        .put("name", "Miku")
        .put("age", 16)
        .put("modules", Table::builder().add("append").add("dark").create())
        .create();

    println!("compact: {}", dex::to_string(&character));
    println!("pretty :\n{}", dex::to_string_pretty(&character));

    // The same structure via the macro.
    let from_macro = dex!("vocaloid" => {
        "name": "Miku",
        "age": 16,
        "modules": ["append", "dark"]
    });
    assert_eq!(from_macro.as_table(), Some(&character));

    // Tables are immutable; "modification" re-creates through a builder.
    let older = character.to_builder().put("age", 17).create();
    println!("updated: {}", dex::to_string(&older));
    assert_eq!(character.get_i64("age").unwrap(), 16);
}
