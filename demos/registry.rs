//! Mapping tagged tables to native types through a `Serialization`
//! registry.
//!
//! Run with: `cargo run --example registry`

use dex::{ComposeError, DexSerialize, Serialization, Table, Value};

#[derive(Debug, PartialEq)]
struct Point {
    x: f64,
    y: f64,
}

impl DexSerialize for Point {
    fn decompose(&self, sel: &Serialization) -> Value {
        Table::builder()
            .put("x", sel.decompose(&self.x))
            .put("y", sel.decompose(&self.y))
            .create()
            .into()
    }

    fn compose(value: &Value, sel: &Serialization) -> Result<Self, ComposeError> {
        let table = Serialization::as_table(value)?;
        Ok(Point {
            x: sel.compose(table.field("x")?)?,
            y: sel.compose(table.field("y")?)?,
        })
    }
}

fn main() {
    let mut sel = Serialization::new();
    sel.register_tag::<Point>("point");

    // Native value -> tagged table -> text.
    let decomposed = sel.decompose(&Point { x: 100.0, y: 100.0 });
    let printed = dex::to_string(decomposed.as_table().unwrap());
    println!("printed: {printed}");

    // Text -> table -> native value, dispatched on the tag.
    let doc = dex::from_str("origin : point { x : 0, y : 0 }").unwrap();
    let table = doc.get_table("origin").unwrap();
    let composed = sel.compose_tagged(table).unwrap();
    let point = composed.downcast_ref::<Point>().unwrap();
    println!("composed: {point:?}");
    assert_eq!(point, &Point { x: 0.0, y: 0.0 });
}
