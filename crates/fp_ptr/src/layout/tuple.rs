use core::mem::offset_of;

use super::{Field, FieldInfo, Layout};
use crate::auto_wrap::AutoWrap;
use crate::convert::ExactFrom;

macro_rules! impl_tuple {
    ($($ty:ident $idx:tt $pos:tt),+) => {
        impl_tuple!(@fields [$($ty),+] $($ty $idx $pos),+);

        unsafe impl<$($ty: 'static),+> Layout for ($($ty,)+) {
            const FIELDS: &'static [FieldInfo] = &[
                $(
                    FieldInfo::new::<$ty>(
                        <Self as Field<$pos>>::NAME,
                        $pos,
                        <Self as Field<$pos>>::OFFSET,
                    ),
                )+
            ];
        }

        impl<$($ty),+> AutoWrap for ($($ty,)+) {
            const IS_POINTER_LIKE: bool = false;
            type Output = Self;

            #[inline(always)]
            fn auto_wrap(self) -> Self {
                self
            }
        }

        impl<$($ty),+> ExactFrom<($($ty,)+)> for ($($ty,)+) {
            #[inline(always)]
            fn exact_from(value: ($($ty,)+)) -> Option<Self> {
                Some(value)
            }
        }
    };
    (@fields $all:tt $($ty:ident $idx:tt $pos:tt),+) => {
        $(
            impl_tuple!(@field $all $ty $idx $pos);
        )+
    };
    (@field [$($all:ident),+] $ty:ident $idx:tt $pos:tt) => {
        unsafe impl<$($all: 'static),+> Field<$pos> for ($($all,)+) {
            type Type = $ty;

            const NAME: &'static str = concat!("_", $pos);
            const OFFSET: usize = offset_of!(($($all,)+), $idx);
        }
    };
}

impl_tuple!(A 0 1);
impl_tuple!(A 0 1, B 1 2);
impl_tuple!(A 0 1, B 1 2, C 2 3);
impl_tuple!(A 0 1, B 1 2, C 2 3, D 3 4);
impl_tuple!(A 0 1, B 1 2, C 2 3, D 3 4, E 4 5);
impl_tuple!(A 0 1, B 1 2, C 2 3, D 3 4, E 4 5, F 5 6);
impl_tuple!(A 0 1, B 1 2, C 2 3, D 3 4, E 4 5, F 5 6, G 6 7);
impl_tuple!(A 0 1, B 1 2, C 2 3, D 3 4, E 4 5, F 5 6, G 6 7, H 7 8);
impl_tuple!(A 0 1, B 1 2, C 2 3, D 3 4, E 4 5, F 5 6, G 6 7, H 7 8, I 8 9);
impl_tuple!(A 0 1, B 1 2, C 2 3, D 3 4, E 4 5, F 5 6, G 6 7, H 7 8, I 8 9, J 9 10);
impl_tuple!(A 0 1, B 1 2, C 2 3, D 3 4, E 4 5, F 5 6, G 6 7, H 7 8, I 8 9, J 9 10, K 10 11);
impl_tuple!(A 0 1, B 1 2, C 2 3, D 3 4, E 4 5, F 5 6, G 6 7, H 7 8, I 8 9, J 9 10, K 10 11, L 11 12);

#[cfg(test)]
mod tests {
    use crate::Handle;
    use crate::layout::Field;
    use core::mem::offset_of;

    #[test]
    fn tuple_offsets_match_the_compiler() {
        type Pair = (u8, u64);

        assert_eq!(<Pair as Field<1>>::OFFSET, offset_of!(Pair, 0));
        assert_eq!(<Pair as Field<2>>::OFFSET, offset_of!(Pair, 1));
        assert_eq!(<Pair as Field<2>>::NAME, "_2");

        let fields = Handle::<Pair>::fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].offset(), offset_of!(Pair, 1));
        assert!(fields[1].type_is::<u64>());
    }

    #[test]
    fn nested_tuple_projection() {
        let mut value: (i32, (f64, i32)) = (1, (2.5, 3));
        let p = Handle::from_mut(&mut value);

        unsafe {
            assert_eq!(p.field::<1>().load(), 1);
            assert_eq!(p.field::<2>().field::<2>().load(), 3);
            assert_eq!(p.field::<2>().load(), (2.5, 3));

            p.field::<2>().field::<1>().store(-1.0);
        }
        assert_eq!(value.1.0, -1.0);
    }

    #[test]
    fn twelve_fields() {
        type Wide = (u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u8, u16);

        let names: alloc::vec::Vec<_> = Handle::<Wide>::field_names().collect();
        assert_eq!(names.len(), 12);
        assert_eq!(names[11], "_12");
        assert_eq!(
            Handle::<Wide>::find_field("_12").unwrap().offset(),
            offset_of!(Wide, 11)
        );
    }
}
