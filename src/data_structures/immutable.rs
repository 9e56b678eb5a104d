use std::ops::Deref;

/// Wrapper that only hands out shared references to its content.
///
/// Used for the parts of the simulator that are built once during initialization
/// and must not change while events are being processed.
#[repr(transparent)]
#[derive(Debug, Clone, Default)]
pub struct Immutable<T>(T);
impl<T> Immutable<T> {
    pub fn new(i: T) -> Self {
        Self(i)
    }
    #[inline(always)]
    pub fn get(&self) -> &T {
        &self.0
    }
}

impl<T> From<T> for Immutable<T> {
    fn from(i: T) -> Self {
        Self(i)
    }
}

impl<T> Deref for Immutable<T> {
    type Target = T;
    #[inline(always)]
    fn deref(&self) -> &T {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deref() {
        let v: Immutable<Vec<u8>> = vec![1, 2, 3].into();
        assert_eq!(v.len(), 3);
        assert_eq!(v.get()[1], 2);
    }
}
