//! Diagnostic printer.
//!
//! Renders any [`Inspect`] value as deterministic, indented text meant for test failure
//! messages. Compound values nested deeper than [`Options::max_depth`] are cut off, long strings
//! and byte sequences are truncated, and long numeric sequences are abbreviated.
//!
//! Output of consecutive [`Printer::print`] calls is separated by exactly one newline, no matter
//! whether the previous rendering ended with one.
use std::io::{self, Write};

use crate::{
    bytes::{crc32_ieee, hex, is_mostly_printable},
    directive::{self, Print},
    error::Error,
    impls::is_numeric,
    value::{Inspect, Kind, Map, Record, Scalar, Seq, Type, Value},
};

/// Limits applied by the [`Printer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Options {
    /// Depth at which compound values are replaced by `(Type)(omitted)`.
    pub max_depth: usize,
    /// Column at which field values start, relative to the field name.
    pub field_width: usize,
    /// Maximal number of characters shown of a string.
    pub string_limit: usize,
    /// Maximal number of bytes shown of a byte sequence.
    pub bytes_limit: usize,
    /// Maximal number of elements shown of a numeric sequence.
    pub seq_limit: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_depth: 10,
            field_width: 14,
            string_limit: 40,
            bytes_limit: 20,
            seq_limit: 10,
        }
    }
}

/// Output writer that remembers whether the last written byte was a newline.
struct Sink<W> {
    inner: W,
    written: usize,
    notnl: bool,
}

impl<W: Write> Write for Sink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        if n != 0 {
            self.notnl = buf[n - 1] != b'\n';
        }
        self.written += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Renders values to a writer.
pub struct Printer<W> {
    sink: Sink<W>,
    options: Options,
    /// Whether a `max-depth` field on the current path has already raised the limit.
    raised: bool,
    /// References followed since the last increase in depth, with that depth.
    hops: Vec<(usize, usize)>,
}

impl<W: Write> Printer<W> {
    /// Creates a printer with default [`Options`].
    pub fn new(inner: W) -> Self {
        Self::with_options(inner, Options::default())
    }

    /// Creates a printer using the given limits.
    pub fn with_options(inner: W, options: Options) -> Self {
        Printer {
            sink: Sink {
                inner,
                written: 0,
                notnl: false,
            },
            options,
            raised: false,
            hops: vec![],
        }
    }

    /// Renders `value`, starting on a new line if the output so far doesn't end with one.
    pub fn print(&mut self, value: &dyn Inspect) -> io::Result<()> {
        self.newline()?;
        let max = self.options.max_depth;
        self.value(value.inspect(), 0, max)
    }

    /// Ends the current line unless the output is empty or already ends with a newline.
    pub fn newline(&mut self) -> io::Result<()> {
        if self.sink.notnl {
            self.sink.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Number of bytes written so far.
    pub fn written(&self) -> usize {
        self.sink.written
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.sink.inner
    }

    fn indent(&mut self, d: usize) -> io::Result<()> {
        if !self.sink.notnl {
            write!(self.sink, "{:1$}", "", 4 * d)?;
        }
        Ok(())
    }

    fn value(&mut self, value: Value<'_>, d: usize, max: usize) -> io::Result<()> {
        let ty = value.ty;

        if d >= max && is_compound(value.kind) {
            return write!(self.sink, "({ty})(omitted)");
        }

        match value.kind {
            Kind::Nil => self.sink.write_all(b"nil"),
            Kind::Opaque(opaque) => write!(self.sink, "{opaque:?}"),
            Kind::Pointer(None) => write!(self.sink, "({ty})(nil)"),
            Kind::Pointer(Some(pointer)) => {
                if pointer.transparent {
                    return self.value(pointer.target.inspect(), d, max);
                }

                // Only a cycle of references without any compound value in between can revisit
                // an address at the same depth.
                let hop = (pointer.addr, d);
                if std::mem::size_of_val(pointer.target) != 0 && self.hops.contains(&hop) {
                    return write!(self.sink, "({ty})(cycle)");
                }

                self.sink.write_all(b"&")?;
                self.hops.push(hop);
                let result = self.value(pointer.target.inspect(), d, max);
                self.hops.pop();
                result
            }
            Kind::Scalar(scalar) => self.scalar(ty, scalar),
            Kind::Seq(seq) => self.seq(ty, seq, d, max),
            Kind::Map(map) => self.map(ty, map, d, max),
            Kind::Struct(record) => self.record(ty, record, d, max),
            Kind::Dynamic(inner) => {
                let inner = inner.inspect();
                write!(self.sink, "({})(", inner.ty)?;
                self.value(inner, d + 1, max)?;
                self.indent(d)?;
                self.sink.write_all(b")")
            }
            Kind::Func(_) => write!(self.sink, "({ty})(func)"),
        }
    }

    fn scalar(&mut self, ty: Type, scalar: Scalar<'_>) -> io::Result<()> {
        let scalar = match scalar {
            Scalar::Str(text) => Scalar::Str(truncate(text, self.options.string_limit)),
            scalar => scalar,
        };

        if ty.is_named() {
            write!(self.sink, "{ty}({scalar})")
        } else {
            write!(self.sink, "{scalar}")
        }
    }

    fn seq(&mut self, ty: Type, seq: Seq<'_>, d: usize, max: usize) -> io::Result<()> {
        let len = seq.items.len();

        if seq.elem == Type::of::<u8>() {
            let data: Vec<u8> = (0..len)
                .filter_map(|index| seq.items.get(index)?.downcast_ref::<u8>().copied())
                .collect();
            return self.bytes(ty, &data);
        }

        let numeric = is_numeric(seq.elem);

        write!(self.sink, "{ty}{{")?;
        for index in 0..len {
            if index != 0 {
                self.sink.write_all(b", ")?;
            }

            if numeric && index == self.options.seq_limit {
                write!(self.sink, "... {} elements", len - index)?;
                break;
            }

            self.value(Value::of(seq.items.get(index)), d + 1, max)?;
        }
        self.sink.write_all(b"}")
    }

    fn bytes(&mut self, ty: Type, data: &[u8]) -> io::Result<()> {
        let head = &data[..data.len().min(self.options.bytes_limit)];
        let printable = is_mostly_printable(head);

        if head.len() == data.len() {
            if printable {
                write!(self.sink, "{ty}(\"{}\")", head.escape_ascii())
            } else {
                write!(self.sink, "{ty}(unhex(\"{}\"))", hex(head))
            }
        } else {
            let (total, hash) = (data.len(), crc32_ieee(data));
            if printable {
                write!(
                    self.sink,
                    "{ty}(\"{}\", \"total_len={total},hash={hash:08x}\")",
                    head.escape_ascii()
                )
            } else {
                write!(
                    self.sink,
                    "{ty}(unhex(\"{}\", \"total_len={total},hash={hash:08x}\"))",
                    hex(head)
                )
            }
        }
    }

    fn record(&mut self, ty: Type, record: &dyn Record, d: usize, max: usize) -> io::Result<()> {
        let variant = record.variant();

        match variant.name {
            Some(name) => write!(self.sink, "{ty}::{name}")?,
            None => write!(self.sink, "{ty}")?,
        }

        if variant.fields.is_empty() {
            if variant.name.is_none() {
                self.sink.write_all(b"{}")?;
            }
            return Ok(());
        }

        self.sink.write_all(b"{\n")?;

        let directives = directive::resolve(ty, &variant);
        let inner = d + 1;

        for (index, (field, directive)) in variant.fields.iter().zip(directives.iter()).enumerate()
        {
            // The first override on a path may raise the limit, later ones only lower it.
            let field_max = match directive.print {
                Print::Omit => continue,
                Print::MaxDepth(extra) if self.raised => max.min(inner + extra),
                Print::MaxDepth(extra) => inner + extra,
                Print::Default => max,
            };

            self.indent(inner)?;
            let pad = self.options.field_width.saturating_sub(field.name.len());
            write!(self.sink, "{}: {:pad$}", field.name, "")?;

            let raised = self.raised;
            self.raised |= matches!(directive.print, Print::MaxDepth(_));
            let result = self.value(Value::of(record.field(index)), inner, field_max);
            self.raised = raised;
            result?;

            self.sink.write_all(b"\n")?;
        }

        self.indent(d)?;
        self.sink.write_all(b"}")
    }

    fn map(&mut self, ty: Type, map: Map<'_>, d: usize, max: usize) -> io::Result<()> {
        write!(self.sink, "{ty}{{")?;

        if map.entries.is_empty() {
            return self.sink.write_all(b"}");
        }

        let inner = d + 1;
        let mut entries = map
            .entries
            .entries()
            .map(|(key, value)| Ok((self.render(key.inspect(), inner, max)?, value)))
            .collect::<io::Result<Vec<_>>>()?;
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        self.sink.write_all(b"\n")?;
        for (key, value) in entries {
            self.indent(inner)?;
            write!(self.sink, "{key}: ")?;
            self.value(value.inspect(), inner, max)?;
            self.sink.write_all(b"\n")?;
        }

        self.indent(d)?;
        self.sink.write_all(b"}")
    }

    fn render(&self, value: Value<'_>, d: usize, max: usize) -> io::Result<String> {
        let mut printer = Printer::with_options(Vec::new(), self.options);
        printer.value(value, d, max)?;
        Ok(String::from_utf8_lossy(&printer.into_inner()).into_owned())
    }
}

fn is_compound(kind: Kind<'_>) -> bool {
    matches!(
        kind,
        Kind::Pointer(Some(_)) | Kind::Seq(_) | Kind::Map(_) | Kind::Struct(_) | Kind::Dynamic(_)
    )
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Renders a single value to a string using default [`Options`].
pub(crate) fn render(value: &dyn Inspect) -> String {
    let mut printer = Printer::new(Vec::new());
    let max = printer.options.max_depth;
    match printer.value(value.inspect(), 0, max) {
        Ok(()) => String::from_utf8_lossy(&printer.into_inner()).into_owned(),
        Err(err) => format!("<{err}>"),
    }
}

/// Prints every argument in order, returning the number of bytes written.
///
/// Arguments are separated by a single newline. The first write failure stops printing and is
/// reported together with the position of the argument being printed.
pub fn fprint<W: Write>(w: W, args: &[&dyn Inspect]) -> Result<usize, Error> {
    let mut printer = Printer::new(w);
    for (arg, value) in args.iter().enumerate() {
        printer
            .print(*value)
            .map_err(|source| Error::Print { arg, source })?;
    }
    Ok(printer.written())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn show(value: &dyn Inspect) -> String {
        render(value)
    }

    #[test]
    fn scalars() {
        assert_eq!(show(&()), "nil");
        assert_eq!(show(&true), "true");
        assert_eq!(show(&-12i32), "-12");
        assert_eq!(show(&1.5f64), "1.5");
        assert_eq!(show(&'x'), "'x'");
        assert_eq!(show(&"a\"b".to_string()), r#""a\"b""#);
    }

    #[test]
    fn long_strings_are_truncated() {
        let text = "x".repeat(50);
        assert_eq!(show(&text), format!("{:?}", "x".repeat(40)));
    }

    #[test]
    fn pointers() {
        assert_eq!(show(&Box::new(3u8)), "&3");
        assert_eq!(show(&Some(Box::new(3u8))), "&3");
        assert_eq!(show(&None::<Box<u8>>), "(Option<Box<u8>>)(nil)");
        assert_eq!(show(&Some(4u16)), "4");
    }

    #[test]
    fn short_byte_sequences() {
        assert_eq!(show(&b"hello".to_vec()), r#"Vec<u8>("hello")"#);
        assert_eq!(
            show(&vec![0u8, 1, 2, 0xff]),
            r#"Vec<u8>(unhex("000102ff"))"#
        );
        assert_eq!(show(&Vec::<u8>::new()), r#"Vec<u8>("")"#);
    }

    #[test]
    fn long_binary_sequences_are_hashed() {
        let data = vec![0u8; 30];
        assert_eq!(
            show(&data),
            format!(
                r#"Vec<u8>(unhex("{}", "total_len=30,hash={:08x}"))"#,
                "00".repeat(20),
                crc32_ieee(&data)
            )
        );
    }

    #[test]
    fn general_sequences() {
        assert_eq!(show(&vec!["a", "b"]), r#"Vec<&str>{"a", "b"}"#);
        assert_eq!(show(&Vec::<bool>::new()), "Vec<bool>{}");
    }

    #[test]
    fn maps_are_sorted_by_key() {
        let map: std::collections::HashMap<&'static str, u32> =
            [("b", 2), ("a", 1), ("c", 3)].into_iter().collect();
        assert_eq!(
            show(&map),
            "HashMap<&str, u32>{\n    \"a\": 1\n    \"b\": 2\n    \"c\": 3\n}"
        );
        assert_eq!(show(&BTreeMap::<u8, u8>::new()), "BTreeMap<u8, u8>{}");
    }

    #[test]
    fn dynamic_values() {
        let boxed: Box<dyn Inspect> = Box::new(5i64);
        assert_eq!(show(&boxed), "(i64)(5)");
    }

    #[test]
    fn functions() {
        fn answer() -> u32 {
            42
        }
        let f: fn() -> u32 = answer;
        assert_eq!(show(&f), "(fn() -> u32)(func)");
    }

    #[test]
    fn opaque_values() {
        assert_eq!(
            show(&std::time::Duration::from_millis(1500)),
            format!("{:?}", std::time::Duration::from_millis(1500))
        );
    }

    #[test]
    fn tuples() {
        assert_eq!(
            show(&(1u8, "x")),
            format!("(u8, &str){{\n    0: {pad}1\n    1: {pad}\"x\"\n}}", pad = " ".repeat(13))
        );
    }
}
