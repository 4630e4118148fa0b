//! [`Inspect`] implementations for builtin and standard library types.
use std::{
    borrow::Cow,
    cell::OnceCell,
    collections::{BTreeMap, HashMap, VecDeque},
    fmt,
    fs::File,
    hash::{BuildHasher, Hash},
    path::PathBuf,
    rc::Rc,
    sync::Arc,
    time::{Duration, Instant, SystemTime},
};

use crate::value::{
    Associative, Field, Inspect, Kind, Map, Pointer, Record, Scalar, Seq, Sequence, Type, Value,
    Variant,
};

impl Inspect for () {
    fn inspect(&self) -> Value<'_> {
        Value::nil()
    }
}

macro_rules! scalars {
    ($($ty:ty => |$value:ident| $scalar:expr;)*) => {
        $(
            impl Inspect for $ty {
                #[inline]
                fn inspect(&self) -> Value<'_> {
                    let $value = self;
                    Value::new(Type::of::<Self>(), Kind::Scalar($scalar))
                }
            }
        )*
    };
}

scalars! {
    bool => |value| Scalar::Bool(*value);
    char => |value| Scalar::Char(*value);
    f32 => |value| Scalar::F32(*value);
    f64 => |value| Scalar::F64(*value);
    i8 => |value| Scalar::Int(*value as i128);
    i16 => |value| Scalar::Int(*value as i128);
    i32 => |value| Scalar::Int(*value as i128);
    i64 => |value| Scalar::Int(*value as i128);
    i128 => |value| Scalar::Int(*value);
    isize => |value| Scalar::Int(*value as i128);
    u8 => |value| Scalar::Uint(*value as u128);
    u16 => |value| Scalar::Uint(*value as u128);
    u32 => |value| Scalar::Uint(*value as u128);
    u64 => |value| Scalar::Uint(*value as u128);
    u128 => |value| Scalar::Uint(*value);
    usize => |value| Scalar::Uint(*value as u128);
    String => |value| Scalar::Str(value);
    &'static str => |value| Scalar::Str(value);
    Box<str> => |value| Scalar::Str(value);
    Cow<'static, str> => |value| Scalar::Str(value);
}

/// Returns `true` for the unnamed numeric primitives.
pub(crate) fn is_numeric(ty: Type) -> bool {
    use std::any::TypeId;

    let id = ty.id();
    [
        TypeId::of::<i8>(),
        TypeId::of::<i16>(),
        TypeId::of::<i32>(),
        TypeId::of::<i64>(),
        TypeId::of::<i128>(),
        TypeId::of::<isize>(),
        TypeId::of::<u8>(),
        TypeId::of::<u16>(),
        TypeId::of::<u32>(),
        TypeId::of::<u64>(),
        TypeId::of::<u128>(),
        TypeId::of::<usize>(),
        TypeId::of::<f32>(),
        TypeId::of::<f64>(),
    ]
    .contains(&id)
}

impl<T: Inspect> Inspect for Box<T> {
    fn inspect(&self) -> Value<'_> {
        Value::new(Type::of::<Self>(), Kind::Pointer(Some(Pointer::to(&**self))))
    }
}

impl<T: Inspect> Inspect for Rc<T> {
    fn inspect(&self) -> Value<'_> {
        Value::new(Type::of::<Self>(), Kind::Pointer(Some(Pointer::to(&**self))))
    }
}

impl<T: Inspect> Inspect for Arc<T> {
    fn inspect(&self) -> Value<'_> {
        Value::new(Type::of::<Self>(), Kind::Pointer(Some(Pointer::to(&**self))))
    }
}

impl<T: Inspect> Inspect for &'static T {
    fn inspect(&self) -> Value<'_> {
        Value::new(Type::of::<Self>(), Kind::Pointer(Some(Pointer::to(*self))))
    }
}

impl<T: Inspect> Inspect for Option<T> {
    fn inspect(&self) -> Value<'_> {
        Value::new(
            Type::of::<Self>(),
            Kind::Pointer(self.as_ref().map(Pointer::inline)),
        )
    }
}

impl<T: Inspect> Inspect for OnceCell<T> {
    fn inspect(&self) -> Value<'_> {
        Value::new(Type::of::<Self>(), Kind::Pointer(self.get().map(Pointer::inline)))
    }
}

impl Inspect for Box<dyn Inspect> {
    fn inspect(&self) -> Value<'_> {
        Value::new(Type::of::<Self>(), Kind::Dynamic(&**self))
    }
}

fn slice_get<T: Inspect>(items: &[T], index: usize) -> Option<&dyn Inspect> {
    items.get(index).map(|item| item as &dyn Inspect)
}

/// Zero sized elements all share one address, so only non-empty sequences of sized elements have
/// an identity.
fn slice_addr<T>(items: &[T]) -> Option<usize> {
    (!items.is_empty() && std::mem::size_of::<T>() != 0).then(|| items.as_ptr() as usize)
}

impl<T: Inspect> Sequence for Vec<T> {
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn get(&self, index: usize) -> Option<&dyn Inspect> {
        slice_get(self, index)
    }
}

impl<T: Inspect> Inspect for Vec<T> {
    fn inspect(&self) -> Value<'_> {
        let seq = Seq {
            addr: slice_addr(self),
            elem: Type::of::<T>(),
            items: self,
        };
        Value::new(Type::of::<Self>(), Kind::Seq(seq))
    }
}

impl<T: Inspect> Sequence for Box<[T]> {
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn get(&self, index: usize) -> Option<&dyn Inspect> {
        slice_get(self, index)
    }
}

impl<T: Inspect> Inspect for Box<[T]> {
    fn inspect(&self) -> Value<'_> {
        let seq = Seq {
            addr: slice_addr(self),
            elem: Type::of::<T>(),
            items: self,
        };
        Value::new(Type::of::<Self>(), Kind::Seq(seq))
    }
}

impl<T: Inspect> Sequence for &'static [T] {
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn get(&self, index: usize) -> Option<&dyn Inspect> {
        slice_get(self, index)
    }
}

impl<T: Inspect> Inspect for &'static [T] {
    fn inspect(&self) -> Value<'_> {
        let seq = Seq {
            addr: slice_addr(self),
            elem: Type::of::<T>(),
            items: self,
        };
        Value::new(Type::of::<Self>(), Kind::Seq(seq))
    }
}

impl<T: Inspect, const N: usize> Sequence for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn get(&self, index: usize) -> Option<&dyn Inspect> {
        slice_get(self, index)
    }
}

impl<T: Inspect, const N: usize> Inspect for [T; N] {
    fn inspect(&self) -> Value<'_> {
        let seq = Seq {
            addr: None,
            elem: Type::of::<T>(),
            items: self,
        };
        Value::new(Type::of::<Self>(), Kind::Seq(seq))
    }
}

impl<T: Inspect> Sequence for VecDeque<T> {
    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn get(&self, index: usize) -> Option<&dyn Inspect> {
        VecDeque::get(self, index).map(|item| item as &dyn Inspect)
    }
}

impl<T: Inspect> Inspect for VecDeque<T> {
    fn inspect(&self) -> Value<'_> {
        let seq = Seq {
            addr: None,
            elem: Type::of::<T>(),
            items: self,
        };
        Value::new(Type::of::<Self>(), Kind::Seq(seq))
    }
}

impl<K, V, S> Associative for HashMap<K, V, S>
where
    K: Inspect + Eq + Hash,
    V: Inspect,
    S: BuildHasher + 'static,
{
    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&dyn Inspect, &dyn Inspect)> + '_> {
        Box::new(
            self.iter()
                .map(|(key, value)| (key as &dyn Inspect, value as &dyn Inspect)),
        )
    }

    fn get(&self, key: &dyn Inspect) -> Option<&dyn Inspect> {
        HashMap::get(self, key.downcast_ref::<K>()?).map(|value| value as &dyn Inspect)
    }
}

impl<K, V, S> Inspect for HashMap<K, V, S>
where
    K: Inspect + Eq + Hash,
    V: Inspect,
    S: BuildHasher + 'static,
{
    fn inspect(&self) -> Value<'_> {
        let map = Map {
            addr: self as *const Self as usize,
            entries: self,
        };
        Value::new(Type::of::<Self>(), Kind::Map(map))
    }
}

impl<K: Inspect + Ord, V: Inspect> Associative for BTreeMap<K, V> {
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&dyn Inspect, &dyn Inspect)> + '_> {
        Box::new(
            self.iter()
                .map(|(key, value)| (key as &dyn Inspect, value as &dyn Inspect)),
        )
    }

    fn get(&self, key: &dyn Inspect) -> Option<&dyn Inspect> {
        BTreeMap::get(self, key.downcast_ref::<K>()?).map(|value| value as &dyn Inspect)
    }
}

impl<K: Inspect + Ord, V: Inspect> Inspect for BTreeMap<K, V> {
    fn inspect(&self) -> Value<'_> {
        let map = Map {
            addr: self as *const Self as usize,
            entries: self,
        };
        Value::new(Type::of::<Self>(), Kind::Map(map))
    }
}

macro_rules! tuples {
    ($(($($index:tt $param:ident),+);)*) => {
        $(
            impl<$($param: Inspect),+> Record for ($($param,)+) {
                fn variant(&self) -> Variant {
                    Variant {
                        index: 0,
                        name: None,
                        fields: &[$(Field { name: stringify!($index), tag: "" }),+],
                    }
                }

                fn field(&self, index: usize) -> Option<&dyn Inspect> {
                    match index {
                        $($index => Some(&self.$index),)+
                        _ => None,
                    }
                }
            }

            impl<$($param: Inspect),+> Inspect for ($($param,)+) {
                fn inspect(&self) -> Value<'_> {
                    Value::new(Type::of::<Self>(), Kind::Struct(self))
                }
            }
        )*
    };
}

tuples! {
    (0 A);
    (0 A, 1 B);
    (0 A, 1 B, 2 C);
    (0 A, 1 B, 2 C, 3 D);
    (0 A, 1 B, 2 C, 3 D, 4 E);
    (0 A, 1 B, 2 C, 3 D, 4 E, 5 F);
}

macro_rules! functions {
    ($(($($param:ident),*);)*) => {
        $(
            impl<$($param: 'static,)* R: 'static> Inspect for fn($($param),*) -> R {
                fn inspect(&self) -> Value<'_> {
                    Value::new(Type::of::<Self>(), Kind::Func(*self as usize))
                }
            }
        )*
    };
}

functions! {
    ();
    (A);
    (A, B);
    (A, B, C);
}

macro_rules! opaque {
    ($($ty:ty),*) => {
        $(
            impl Inspect for $ty {
                fn inspect(&self) -> Value<'_> {
                    Value::new(Type::of::<Self>(), Kind::Opaque(self))
                }
            }
        )*
    };
}

opaque!(SystemTime, Instant, Duration, PathBuf);

/// An open file, equal only to itself.
#[repr(transparent)]
struct FileHandle(File);

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl PartialEq for FileHandle {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Inspect for File {
    fn inspect(&self) -> Value<'_> {
        // SAFETY: `FileHandle` is a `repr(transparent)` wrapper around `File`.
        let handle = unsafe { &*(self as *const File as *const FileHandle) };
        Value::new(Type::of::<Self>(), Kind::Opaque(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_widths_keep_their_type() {
        assert_ne!(5i32.inspect().ty, 5i64.inspect().ty);
        assert!(matches!(
            5u8.inspect().kind,
            Kind::Scalar(Scalar::Uint(5))
        ));
        assert!(matches!(
            (-3i16).inspect().kind,
            Kind::Scalar(Scalar::Int(-3))
        ));
    }

    #[test]
    fn sequences() {
        let items = vec![1u16, 2, 3];
        let Kind::Seq(seq) = items.inspect().kind else {
            panic!("expected a sequence");
        };
        assert_eq!(seq.items.len(), 3);
        assert_eq!(seq.elem, Type::of::<u16>());
        assert_eq!(seq.addr, Some(items.as_ptr() as usize));
        assert!(seq.items.get(3).is_none());

        let units = [(); 4];
        let Kind::Seq(seq) = units.inspect().kind else {
            panic!("expected a sequence");
        };
        assert_eq!(seq.addr, None);
    }

    #[test]
    fn map_lookup_by_dynamic_key() {
        let map: BTreeMap<String, u32> = [("a".to_string(), 1)].into_iter().collect();
        let Kind::Map(view) = map.inspect().kind else {
            panic!("expected a map");
        };
        let key = "a".to_string();
        assert!(view.entries.get(&key).is_some());
        assert!(view.entries.get(&"b".to_string()).is_none());
        assert!(view.entries.get(&1u32).is_none());
    }

    #[test]
    fn tuples_are_records() {
        let pair = (1u8, "x");
        let Kind::Struct(record) = pair.inspect().kind else {
            panic!("expected a record");
        };
        let variant = record.variant();
        assert_eq!(variant.fields.len(), 2);
        assert_eq!(variant.fields[1].name, "1");
        assert!(record.field(2).is_none());
    }
}
