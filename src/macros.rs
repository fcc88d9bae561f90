/// Builds a [`Value`](crate::Value) from literal syntax.
///
/// Arrays become positional tables, objects become keyed tables, and a
/// `tag => { ... }` / `tag => [ ... ]` form attaches a type tag.
///
/// ```rust
/// use dex::dex;
///
/// let character = dex!("vocaloid" => {
///     "name": "MAYU",
///     "age": 15,
///     "tags": ["yandere", "lolita"]
/// });
///
/// let table = character.as_table().unwrap();
/// assert_eq!(table.tag(), "vocaloid");
/// assert_eq!(table.get_table("tags").unwrap().len(), 2);
/// ```
#[macro_export]
macro_rules! dex {
    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Table($crate::Table::builder().create())
    };

    ([ $($elem:tt),* $(,)? ]) => {{
        let mut builder = $crate::Table::builder();
        $( builder = builder.add($crate::dex!($elem)); )*
        $crate::Value::Table(builder.create())
    }};

    ({}) => {
        $crate::Value::Table($crate::Table::builder().create())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut builder = $crate::Table::builder();
        $( builder = builder.put($key, $crate::dex!($value)); )*
        $crate::Value::Table(builder.create())
    }};

    ($tag:literal => [ $($elem:tt),* $(,)? ]) => {{
        let mut builder = $crate::Table::builder_tagged($tag);
        $( builder = builder.add($crate::dex!($elem)); )*
        $crate::Value::Table(builder.create())
    }};

    ($tag:literal => { $($key:literal : $value:tt),* $(,)? }) => {{
        let mut builder = $crate::Table::builder_tagged($tag);
        $( builder = builder.put($key, $crate::dex!($value)); )*
        $crate::Value::Table(builder.create())
    }};

    ($other:expr) => {
        $crate::Value::from($other)
    };
}
