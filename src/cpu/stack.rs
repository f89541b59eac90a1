use crate::errors::VmError;
use crate::utils::Word;

/// Unbounded LIFO of words.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stack {
    s: Vec<Word>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value:Word) {
        self.s.push(value);
    }

    /// Fails with `EmptyStack` and leaves the stack untouched when empty.
    pub fn pop(&mut self) -> Result<Word, VmError> {
        self.s.pop().ok_or(VmError::EmptyStack)
    }

    pub fn len(&self) -> usize {
        self.s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }

    /// Up to `n` most recently pushed words, most recent first.
    pub fn head(&self, n:usize) -> Vec<Word> {
        self.s.iter().rev().take(n).copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pop_empty() {
        let mut stack = Stack::new();
        assert!(matches!(stack.pop(), Err(VmError::EmptyStack)));
        assert_eq!(stack.len(), 0);
    }

    #[test]
    fn test_head_shorter_than_n() {
        let mut stack = Stack::new();
        stack.push(1);
        stack.push(2);
        assert_eq!(stack.head(10), vec![2, 1]);
        assert_eq!(stack.head(0), Vec::<Word>::new());
    }

    proptest! {
        #[test]
        fn pops_in_reverse_push_order(values in proptest::collection::vec(0u16..0x8000, 0..64)) {
            let mut stack = Stack::new();
            for v in &values {
                stack.push(*v);
            }
            for v in values.iter().rev() {
                prop_assert_eq!(stack.pop().unwrap(), *v);
            }
            prop_assert!(matches!(stack.pop(), Err(VmError::EmptyStack)));
        }

        #[test]
        fn head_is_recent_first_and_idempotent(
            values in proptest::collection::vec(0u16..0x8000, 0..64),
            k in 0usize..80,
        ) {
            let mut stack = Stack::new();
            for v in &values {
                stack.push(*v);
            }
            let head = stack.head(k);
            let expected:Vec<Word> = values.iter().rev().take(k).copied().collect();
            prop_assert_eq!(head.len(), k.min(values.len()));
            prop_assert_eq!(&head, &expected);
            prop_assert_eq!(stack.head(k), head);
            prop_assert_eq!(stack.len(), values.len());
        }
    }
}
