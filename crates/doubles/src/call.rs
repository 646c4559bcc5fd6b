/// One recorded invocation of a double. Never modified once recorded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call<A> {
    args: A,
    index: usize,
}

impl<A> Call<A> {
    pub(crate) fn new(args: A, index: usize) -> Self {
        Self { args, index }
    }

    pub fn args(&self) -> &A {
        &self.args
    }

    /// Position of this call in the double's history, starting at 0
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn into_args(self) -> A {
        self.args
    }
}
