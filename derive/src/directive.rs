use syn::LitStr;

const COMPARE_VALUES: &[&str] = &["false", "nil", "isnil", "pointer", "ptr"];

/// Checks the directive text of a field so that typos are reported at compile time.
pub fn validate_field(tag: &LitStr) -> syn::Result<()> {
    let text = tag.value();

    for entry in text.split(',').map(str::trim) {
        if entry == "-" {
            continue;
        }

        let Some((key, value)) = entry.split_once('=') else {
            bail!(tag, "directive `{entry}` needs a value, expected `compare=..` or `print=..`");
        };

        match key {
            "compare" => {
                if !COMPARE_VALUES.contains(&value) {
                    bail!(
                        tag,
                        "unknown compare directive `{value}`, expected one of {}",
                        COMPARE_VALUES.join(", ")
                    );
                }
            }
            "print" => {
                if value == "omit" {
                    continue;
                }
                let depth = value
                    .strip_prefix("max-depth=")
                    .or_else(|| value.strip_prefix("maxdepth="));
                match depth {
                    Some(depth) if depth.parse::<usize>().is_ok() => {}
                    Some(depth) => bail!(tag, "invalid depth `{depth}` in print directive"),
                    None => bail!(
                        tag,
                        "unknown print directive `{value}`, expected `omit` or `max-depth=N`"
                    ),
                }
            }
            other => bail!(tag, "unknown directive `{other}`"),
        }
    }

    Ok(())
}

/// How a type as a whole is inspected.
pub enum Container {
    /// Fields are exposed through `Record`.
    Record,
    /// The value is compared and printed as a unit.
    Opaque,
    /// The value is a named wrapper around its only field.
    Newtype,
}

pub fn parse_container(tags: &[LitStr]) -> syn::Result<Container> {
    let mut container = Container::Record;
    for tag in tags {
        container = match tag.value().trim() {
            "opaque" => Container::Opaque,
            "newtype" => Container::Newtype,
            other => bail!(
                tag,
                "unknown type directive `{other}`, expected `opaque` or `newtype`"
            ),
        };
    }
    Ok(container)
}
