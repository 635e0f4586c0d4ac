/// A capability the model can ask the host to run.
///
/// Implementors are the deserialized arguments of a single call: the catalog
/// parses the raw JSON payload into `Self` and then calls [`Tool::apply`].
pub trait Tool {
    type Context;
    fn apply(&self, context: Self::Context) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoContext();
