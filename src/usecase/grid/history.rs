use std::collections::VecDeque;

pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// An action that knows how to redo and undo itself against `T`.
pub trait Reversible<T> {
    fn apply(&self, target: &mut T);
    fn revert(&self, target: &mut T);
}

/// Bounded undo/redo history. Commands are pushed after they have been
/// applied; the stack only replays them.
#[derive(Debug, Clone)]
pub struct CommandStack<C> {
    undo_stack: VecDeque<C>,
    redo_stack: Vec<C>,
    capacity: usize,
}

impl<C> Default for CommandStack<C> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl<C> CommandStack<C> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, command: C) {
        self.redo_stack.clear();
        self.undo_stack.push_back(command);
        while self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
    }

    pub fn undo<T>(&mut self, target: &mut T) -> bool
    where
        C: Reversible<T>,
    {
        let Some(command) = self.undo_stack.pop_back() else {
            return false;
        };
        command.revert(target);
        self.redo_stack.push(command);
        true
    }

    pub fn redo<T>(&mut self, target: &mut T) -> bool
    where
        C: Reversible<T>,
    {
        let Some(command) = self.redo_stack.pop() else {
            return false;
        };
        command.apply(target);
        self.undo_stack.push_back(command);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// The command the next `undo` would revert.
    pub fn next_undo(&self) -> Option<&C> {
        self.undo_stack.back()
    }

    pub fn next_redo(&self) -> Option<&C> {
        self.redo_stack.last()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Append(i32);

    impl Reversible<Vec<i32>> for Append {
        fn apply(&self, target: &mut Vec<i32>) {
            target.push(self.0);
        }

        fn revert(&self, target: &mut Vec<i32>) {
            target.pop();
        }
    }

    fn run(stack: &mut CommandStack<Append>, target: &mut Vec<i32>, value: i32) {
        let command = Append(value);
        command.apply(target);
        stack.push(command);
    }

    #[test]
    fn undo_then_redo_restores_state() {
        let mut stack = CommandStack::default();
        let mut values = Vec::new();
        run(&mut stack, &mut values, 1);
        run(&mut stack, &mut values, 2);

        assert!(stack.undo(&mut values));
        assert_eq!(values, vec![1]);
        assert!(stack.redo(&mut values));
        assert_eq!(values, vec![1, 2]);
        assert!(!stack.can_redo());
    }

    #[test]
    fn new_command_after_undo_drops_redo_history() {
        let mut stack = CommandStack::default();
        let mut values = Vec::new();
        run(&mut stack, &mut values, 1);
        run(&mut stack, &mut values, 2);
        stack.undo(&mut values);
        stack.undo(&mut values);

        run(&mut stack, &mut values, 3);

        assert!(!stack.can_redo());
        assert!(!stack.redo(&mut values));
        assert_eq!(values, vec![3]);
    }

    #[test]
    fn capacity_evicts_oldest_first() {
        let mut stack = CommandStack::with_capacity(3);
        let mut values = Vec::new();
        for value in 1..=5 {
            run(&mut stack, &mut values, value);
        }

        assert_eq!(stack.undo_len(), 3);
        while stack.undo(&mut values) {}
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn default_capacity_is_fifty() {
        let mut stack = CommandStack::default();
        let mut values = Vec::new();
        for value in 0..80 {
            run(&mut stack, &mut values, value);
        }

        assert_eq!(stack.undo_len(), DEFAULT_HISTORY_CAPACITY);
        assert_eq!(stack.undo_len(), 50);
    }

    #[test]
    fn undo_on_empty_stack_is_noop() {
        let mut stack: CommandStack<Append> = CommandStack::default();
        let mut values = vec![9];

        assert!(!stack.undo(&mut values));
        assert_eq!(values, vec![9]);
    }
}
