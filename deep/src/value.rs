//! Type-erased views of values.
//!
//! Rust has no runtime reflection, so every type that takes part in structural comparison or
//! diagnostic printing describes itself through [`Inspect`]. An implementation returns a
//! [`Value`]: the static [`Type`] of the value together with a [`Kind`] that exposes the value's
//! contents in one of a small, closed set of shapes. The equality engine and the printer only
//! ever dispatch on these shapes, so they handle arbitrary types without per-type code.
use std::{
    any::{Any, TypeId},
    fmt,
    hash::{Hash, Hasher},
};

use crate::fmt::short_type_name;

/// Upcast to [`Any`], blanket implemented for every `'static` type.
pub trait AsAny {
    /// Returns `self` as a [`dyn Any`][Any].
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    #[inline(always)]
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Types that can be compared structurally and rendered by the diagnostic printer.
///
/// Implemented for most standard library types. For user defined types use
/// `#[derive(Inspect)]`.
pub trait Inspect: AsAny + 'static {
    /// Returns a view of this value.
    fn inspect(&self) -> Value<'_>;
}

impl dyn Inspect {
    /// Returns the inspected value as a `T` if it is of that type.
    pub fn downcast_ref<T: Inspect>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }
}

/// Static type identity of an inspected value.
///
/// Two types are equal iff their [`TypeId`]s are equal. The `named` flag marks user defined
/// types, which changes how scalars are rendered.
#[derive(Clone, Copy)]
pub struct Type {
    id: TypeId,
    name: &'static str,
    named: bool,
}

impl Type {
    /// The identity of a builtin or standard library type.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Type {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            named: false,
        }
    }

    /// The identity of a user defined type.
    pub fn named<T: ?Sized + 'static>() -> Self {
        Type {
            named: true,
            ..Self::of::<T>()
        }
    }

    /// Returns the [`TypeId`] of this type.
    pub fn id(self) -> TypeId {
        self.id
    }

    /// Returns the fully qualified type name.
    pub fn name(self) -> &'static str {
        self.name
    }

    /// Returns `true` for user defined types.
    pub fn is_named(self) -> bool {
        self.named
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&short_type_name(self.name), f)
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// A view of a value: its type and its contents.
#[derive(Clone, Copy)]
pub struct Value<'a> {
    /// Static type of the value.
    pub ty: Type,
    /// Shape and contents of the value.
    pub kind: Kind<'a>,
}

/// The shapes a [`Value`] can have.
#[derive(Clone, Copy)]
pub enum Kind<'a> {
    /// The absence of a value.
    Nil,
    /// A scalar compared by value.
    Scalar(Scalar<'a>),
    /// A nullable reference to another value.
    Pointer(Option<Pointer<'a>>),
    /// An ordered, indexable sequence.
    Seq(Seq<'a>),
    /// An associative container.
    Map(Map<'a>),
    /// A record with named fields, or an enum with the fields of its active variant.
    Struct(&'a dyn Record),
    /// A container holding a value whose type is only known at runtime.
    Dynamic(&'a dyn Inspect),
    /// A function pointer, identified by its address.
    Func(usize),
    /// A value that is never expanded, rendered with its own [`Debug`][fmt::Debug] output.
    Opaque(&'a dyn Opaque),
}

/// Scalar contents, wide enough to hold every primitive of the corresponding class.
#[derive(Clone, Copy, Debug)]
pub enum Scalar<'a> {
    /// A `bool`.
    Bool(bool),
    /// A signed integer of any width.
    Int(i128),
    /// An unsigned integer of any width.
    Uint(u128),
    /// An `f32`.
    F32(f32),
    /// An `f64`.
    F64(f64),
    /// A `char`.
    Char(char),
    /// A string slice.
    Str(&'a str),
}

impl PartialEq for Scalar<'_> {
    fn eq(&self, other: &Self) -> bool {
        // Floats compare bitwise so that every value, NaN included, equals itself.
        match (*self, *other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            (Scalar::Uint(a), Scalar::Uint(b)) => a == b,
            (Scalar::F32(a), Scalar::F32(b)) => a.to_bits() == b.to_bits(),
            (Scalar::F64(a), Scalar::F64(b)) => a.to_bits() == b.to_bits(),
            (Scalar::Char(a), Scalar::Char(b)) => a == b,
            (Scalar::Str(a), Scalar::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Scalar<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(value) => write!(f, "{value}"),
            Scalar::Int(value) => write!(f, "{value}"),
            Scalar::Uint(value) => write!(f, "{value}"),
            Scalar::F32(value) => write!(f, "{value:?}"),
            Scalar::F64(value) => write!(f, "{value:?}"),
            Scalar::Char(value) => write!(f, "{value:?}"),
            Scalar::Str(value) => write!(f, "{value:?}"),
        }
    }
}

/// A non-null reference.
#[derive(Clone, Copy)]
pub struct Pointer<'a> {
    /// Address of the referenced value, used as its identity.
    pub addr: usize,
    /// `true` for wrappers like `Option` that store the value inline and thus can't be part of a
    /// reference cycle.
    pub transparent: bool,
    /// The referenced value.
    pub target: &'a dyn Inspect,
}

impl<'a> Pointer<'a> {
    /// A reference to a separately stored value.
    pub fn to<T: Inspect>(target: &'a T) -> Self {
        Pointer {
            addr: target as *const T as usize,
            transparent: false,
            target,
        }
    }

    /// A reference to a value stored inline in a wrapper.
    pub fn inline<T: Inspect>(target: &'a T) -> Self {
        Pointer {
            transparent: true,
            ..Self::to(target)
        }
    }
}

/// A sequence view.
#[derive(Clone, Copy)]
pub struct Seq<'a> {
    /// Address of the heap allocation backing the sequence, if any.
    pub addr: Option<usize>,
    /// Type of the elements.
    pub elem: Type,
    /// The elements.
    pub items: &'a dyn Sequence,
}

/// An associative container view.
#[derive(Clone, Copy)]
pub struct Map<'a> {
    /// Address of the container.
    pub addr: usize,
    /// The entries.
    pub entries: &'a dyn Associative,
}

/// Indexed access to the elements of a sequence.
pub trait Sequence {
    /// Number of elements.
    fn len(&self) -> usize;

    /// Returns `true` if there are no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the element at `index`.
    fn get(&self, index: usize) -> Option<&dyn Inspect>;
}

/// Keyed access to the entries of an associative container.
pub trait Associative {
    /// Number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if there are no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over all entries in the container's own order.
    fn entries(&self) -> Box<dyn Iterator<Item = (&dyn Inspect, &dyn Inspect)> + '_>;

    /// Looks up the value stored for `key`.
    ///
    /// Lookup uses the key type's own equality. Returns `None` if `key` is of a different type.
    fn get(&self, key: &dyn Inspect) -> Option<&dyn Inspect>;
}

/// A named field of a record, with its raw directive text.
#[derive(Clone, Copy, Debug)]
pub struct Field {
    /// Field name, or its position for tuple-like records.
    pub name: &'static str,
    /// Raw directive text, see [`directive`][crate::directive].
    pub tag: &'static str,
}

/// The active variant of a record.
///
/// Structs have a single unnamed variant.
#[derive(Clone, Copy, Debug)]
pub struct Variant {
    /// Position of the variant in its declaration.
    pub index: usize,
    /// Variant name for enums.
    pub name: Option<&'static str>,
    /// Fields of this variant in declaration order.
    pub fields: &'static [Field],
}

/// Field access for struct-like values, usually implemented with `#[derive(Inspect)]`.
pub trait Record {
    /// Returns the active variant together with its field table.
    fn variant(&self) -> Variant;

    /// Returns the field at `index` of the active variant.
    fn field(&self, index: usize) -> Option<&dyn Inspect>;
}

/// Values that are rendered and compared as a whole.
pub trait Opaque: AsAny + fmt::Debug {
    /// Compares with another opaque value, `false` when the types differ.
    fn eq_opaque(&self, other: &dyn Opaque) -> bool;
}

impl<T: fmt::Debug + PartialEq + 'static> Opaque for T {
    fn eq_opaque(&self, other: &dyn Opaque) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }
}

impl<'a> Value<'a> {
    /// Creates a view from its parts.
    #[inline(always)]
    pub fn new(ty: Type, kind: Kind<'a>) -> Self {
        Value { ty, kind }
    }

    /// The absence of a value.
    pub fn nil() -> Self {
        Value::new(Type::of::<()>(), Kind::Nil)
    }

    /// Views an optional field, treating a missing one as nil.
    pub fn of(value: Option<&'a dyn Inspect>) -> Self {
        value.map_or_else(Value::nil, |value| value.inspect())
    }

    /// Returns whether this value is nil, or `None` for kinds that can't be nil.
    ///
    /// Null pointers are nil. Sequences and maps count as nil when empty.
    pub fn is_nil(&self) -> Option<bool> {
        match self.kind {
            Kind::Nil | Kind::Pointer(None) => Some(true),
            Kind::Pointer(Some(_)) | Kind::Dynamic(_) | Kind::Func(_) => Some(false),
            Kind::Seq(seq) => Some(seq.items.is_empty()),
            Kind::Map(map) => Some(map.entries.is_empty()),
            Kind::Scalar(_) | Kind::Struct(_) | Kind::Opaque(_) => None,
        }
    }

    /// Returns the identity of the referenced storage, or `None` for kinds without one.
    ///
    /// A null pointer has identity `0`. Inline wrappers report the identity of the wrapped value
    /// when it has one.
    pub fn identity(&self) -> Option<usize> {
        match self.kind {
            Kind::Pointer(None) => Some(0),
            Kind::Pointer(Some(pointer)) if pointer.transparent => {
                pointer.target.inspect().identity().or(Some(pointer.addr))
            }
            Kind::Pointer(Some(pointer)) => Some(pointer.addr),
            Kind::Seq(seq) => seq.addr,
            Kind::Map(map) => Some(map.addr),
            Kind::Dynamic(inner) => Some(inner as *const dyn Inspect as *const () as usize),
            Kind::Func(addr) => Some(addr),
            Kind::Nil | Kind::Scalar(_) | Kind::Struct(_) | Kind::Opaque(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    #[test]
    fn type_identity() {
        assert_eq!(Type::of::<u32>(), Type::of::<u32>());
        assert_ne!(Type::of::<u32>(), Type::of::<i32>());
        assert_eq!(Type::of::<Vec<u8>>().to_string(), "Vec<u8>");
        assert!(!Type::of::<u8>().is_named());
    }

    #[test]
    fn float_scalars_compare_bitwise() {
        assert_eq!(Scalar::F64(f64::NAN), Scalar::F64(f64::NAN));
        assert_ne!(Scalar::F64(0.0), Scalar::F64(-0.0));
        assert_ne!(Scalar::Int(1), Scalar::Uint(1));
    }

    #[test]
    fn nil_and_identity() {
        let none: Option<Box<u32>> = None;
        assert_eq!(Inspect::inspect(&none).is_nil(), Some(true));
        assert_eq!(Inspect::inspect(&none).identity(), Some(0));
        assert_eq!(5u32.inspect().is_nil(), None);
        assert_eq!(Vec::<u32>::new().inspect().is_nil(), Some(true));

        let shared = Rc::new(3u32);
        let other = shared.clone();
        assert_eq!(shared.inspect().identity(), other.inspect().identity());
        assert_eq!(
            Inspect::inspect(&Some(shared.clone())).identity(),
            shared.inspect().identity()
        );
        assert_ne!(
            Rc::new(3u32).inspect().identity(),
            shared.inspect().identity()
        );
    }

    #[test]
    fn dynamic_downcast() {
        let boxed: Box<dyn Inspect> = Box::new(7i64);
        assert_eq!(boxed.downcast_ref::<i64>(), Some(&7));
        assert_eq!(boxed.downcast_ref::<i32>(), None);
    }
}
