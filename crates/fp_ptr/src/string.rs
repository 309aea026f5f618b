use alloc::string::String;
use alloc::vec::Vec;
use core::ffi::{CStr, c_char};
use core::slice;

use crate::Handle;
use crate::error::MaterializeError;

// Byte strings are read through `u8` or `i8` handles, the two shapes a
// foreign `char *` usually takes.
macro_rules! impl_byte_string {
    ($($byte:ty),+) => {$(
        impl Handle<$byte> {
            /// Views the zero-terminated string starting at this address.
            ///
            /// # Safety
            ///
            /// The address must start a zero-terminated byte string that
            /// stays valid and unmodified for `'a`.
            #[inline]
            pub unsafe fn c_str<'a>(self) -> &'a CStr {
                // SAFETY: forwarded to the caller.
                unsafe { CStr::from_ptr(self.0.cast_const().cast::<c_char>()) }
            }

            /// Copies bytes starting at this address.
            ///
            /// With `None`, reads up to and excluding the first zero byte.
            /// With `Some(len)`, reads exactly `len` bytes, zero bytes
            /// included.
            ///
            /// # Safety
            ///
            /// With `None`, the bytes up to the terminator must be readable.
            /// With `Some(len)`, `len` bytes must be readable.
            ///
            /// # Examples
            ///
            /// ```
            /// use fp_ptr::Handle;
            ///
            /// let mut buf = *b"ab\0cd\0";
            /// let p = Handle::from_source(&mut buf);
            ///
            /// assert_eq!(unsafe { p.bytes(None) }, b"ab");
            /// assert_eq!(unsafe { p.bytes(Some(5)) }, b"ab\0cd");
            /// ```
            pub unsafe fn bytes(self, len: Option<usize>) -> Vec<u8> {
                match len {
                    // SAFETY: forwarded to the caller.
                    None => unsafe { self.c_str() }.to_bytes().to_vec(),
                    Some(0) => Vec::new(),
                    Some(len) => {
                        // SAFETY: forwarded to the caller.
                        unsafe { slice::from_raw_parts(self.0.cast_const().cast::<u8>(), len) }
                            .to_vec()
                    }
                }
            }

            /// Copies bytes as [`bytes`](Self::bytes) does and decodes them
            /// as UTF-8.
            ///
            /// # Errors
            ///
            /// [`MaterializeError::InvalidUtf8`] if the bytes are not UTF-8.
            ///
            /// # Safety
            ///
            /// Same as [`bytes`](Self::bytes).
            #[inline]
            pub unsafe fn string(self, len: Option<usize>) -> Result<String, MaterializeError> {
                // SAFETY: forwarded to the caller.
                let bytes = unsafe { self.bytes(len) };
                String::from_utf8(bytes).map_err(|e| {
                    log::debug!("bytes at {:p} are not UTF-8: {e}", self.0);
                    MaterializeError::from(e)
                })
            }

            /// Like [`string`](Self::string), replacing invalid sequences with
            /// `U+FFFD`.
            ///
            /// # Safety
            ///
            /// Same as [`bytes`](Self::bytes).
            #[inline]
            pub unsafe fn string_lossy(self, len: Option<usize>) -> String {
                // SAFETY: forwarded to the caller.
                let bytes = unsafe { self.bytes(len) };
                String::from_utf8_lossy(&bytes).into_owned()
            }
        }
    )+};
}

impl_byte_string!(u8, i8);

#[cfg(test)]
mod tests {
    use crate::Handle;
    use crate::error::MaterializeError;
    use alloc::string::String;

    #[test]
    fn hello_world() {
        let mut text = String::from("hello world");
        let p = Handle::from_source(&mut text);

        unsafe {
            assert_eq!(p.string(Some(5)).unwrap(), "hello");
            assert_eq!((p + 6).string(Some(5)).unwrap(), "world");
            assert_eq!(p.string(Some(0)).unwrap(), "");
        }
    }

    #[test]
    fn terminator_and_embedded_zeros() {
        let mut buf = *b"one\0two\0";
        let p = Handle::from_source(&mut buf);

        unsafe {
            assert_eq!(p.string(None).unwrap(), "one");
            assert_eq!(p.bytes(Some(7)), b"one\0two");
            assert_eq!((p + 4).c_str().to_str(), Ok("two"));
        }
    }

    #[test]
    fn signed_bytes() {
        let mut buf = [b'h' as i8, b'i' as i8, 0];
        let p = Handle::from_source(&mut buf);

        assert_eq!(unsafe { p.string(None) }.unwrap(), "hi");
    }

    #[test]
    fn invalid_utf8() {
        let mut buf = [0x66u8, 0xff, 0x6f, 0];
        let p = Handle::from_source(&mut buf);

        let err = unsafe { p.string(None) }.unwrap_err();
        assert!(matches!(err, MaterializeError::InvalidUtf8(_)));
        assert_eq!(unsafe { p.string_lossy(None) }, "f\u{fffd}o");
    }
}
