use crate::types::Context;

/// Maps text to a fixed-length vector. Implementations must be callable
/// synchronously; the router treats each call as blocking I/O.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Produces response text for a query.
pub trait Generator: Send + Sync {
    /// Response for a query already classified into `category`.
    fn generate(&self, category: &str, text: &str, context: &Context) -> anyhow::Result<String>;
    /// Response for a query with no category.
    fn generate_free(&self, text: &str, context: &Context) -> anyhow::Result<String>;
}
