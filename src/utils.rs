use crate::{Error, Result};

pub(crate) trait AsLasStr {
    fn as_las_string_lossy(&self) -> String;
}

pub(crate) trait FromLasStr {
    fn from_las_str(&mut self, s: &str) -> Result<()>;
}

impl AsLasStr for &'_ [u8] {
    fn as_las_string_lossy(&self) -> String {
        let end = self.iter().position(|&b| b == 0).unwrap_or(self.len());
        String::from_utf8_lossy(&self[..end]).into_owned()
    }
}

impl FromLasStr for &'_ mut [u8] {
    fn from_las_str(&mut self, s: &str) -> Result<()> {
        if !s.is_ascii() {
            return Err(Error::NotAscii(s.to_string()));
        }
        if s.len() > self.len() {
            return Err(Error::StringTooLong {
                string: s.to_string(),
                len: self.len(),
            });
        }
        for (a, b) in self.iter_mut().zip(s.bytes().chain(std::iter::repeat(0))) {
            *a = b;
        }
        Ok(())
    }
}

pub(crate) fn some_or_none_if_zero<T: Default + PartialEq>(n: T) -> Option<T> {
    if n == T::default() { None } else { Some(n) }
}
