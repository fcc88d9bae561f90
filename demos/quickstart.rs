//! Your first DeX document: parse, query, reprint.
//!
//! Run with: `cargo run --example quickstart`

fn main() -> Result<(), dex::ParseError> {
    let source = r#"
MAYU : vocaloid {
    taglist { yandere, lolita, gothic }

    gender  : female
    age     : 15
    company : EXIT TUNES
}
"#;

    let doc = dex::from_str(source)?;
    let mayu = doc.get_table("MAYU").expect("MAYU entry");

    println!("tag      : {}", mayu.tag());
    println!("gender   : {}", mayu.get_str("gender").unwrap());
    println!("age      : {}", mayu.get_i64("age").unwrap());

    let tags = mayu.get_table("taglist").unwrap();
    println!("tags     : {:?}", tags.values().iter().collect::<Vec<_>>());

    println!("\ncompact  : {}", dex::to_string(&doc));
    println!("\npretty   :\n{}", dex::to_string_pretty(&doc));
    Ok(())
}
