use crate::chart::ChartConfig;

/// A charting surface that can build and dispose chart instances.
pub trait ChartBackend {
    type Handle;

    fn create(&mut self, config: &ChartConfig) -> Self::Handle;

    fn destroy(&mut self, handle: Self::Handle);
}

/// Owns at most one live chart on a backend.
///
/// Every render disposes the previous instance before creating the next, and
/// dropping the host disposes whatever is still live.
pub struct ChartHost<B: ChartBackend> {
    backend: B,
    live: Option<B::Handle>,
}

impl<B: ChartBackend> ChartHost<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            live: None,
        }
    }

    /// Replace the current chart. `None` tears the current chart down and draws nothing.
    pub fn render(&mut self, config: Option<&ChartConfig>) {
        self.teardown();
        if let Some(config) = config {
            self.live = Some(self.backend.create(config));
        }
    }

    pub fn teardown(&mut self) {
        if let Some(handle) = self.live.take() {
            self.backend.destroy(handle);
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: ChartBackend> Drop for ChartHost<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}
