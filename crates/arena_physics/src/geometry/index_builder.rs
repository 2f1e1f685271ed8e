//! Background octree construction
//!
//! Loading and indexing a level can take longer than a frame. The builder
//! runs the provider and the octree build on a worker thread and hands the
//! finished index back through a channel that the frame loop polls.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use log::debug;

use super::{GeometryError, GeometryProvider};
use crate::spatial::{Octree, OctreeConfig};

/// Handle to an octree being built on another thread
#[derive(Debug)]
pub struct IndexBuilder {
    receiver: Receiver<Result<Octree, GeometryError>>,
}

impl IndexBuilder {
    /// Start building an index from `provider` on a worker thread
    pub fn spawn<P>(provider: P, config: OctreeConfig) -> Self
    where
        P: GeometryProvider + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let result = build_index(&provider, config);
            // The receiver may have been dropped; nothing left to notify
            let _ = sender.send(result);
        });
        Self { receiver }
    }

    /// The finished index, if the worker is done
    ///
    /// Returns `None` while the build is still running. Once a result has
    /// been returned, later polls report [`GeometryError::BuilderDisconnected`].
    pub fn poll(&self) -> Option<Result<Octree, GeometryError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(GeometryError::BuilderDisconnected)),
        }
    }

    /// Block until the worker delivers
    pub fn wait(self) -> Result<Octree, GeometryError> {
        self.receiver
            .recv()
            .unwrap_or(Err(GeometryError::BuilderDisconnected))
    }
}

/// Load triangles from `provider` and index them
pub fn build_index(
    provider: &dyn GeometryProvider,
    config: OctreeConfig,
) -> Result<Octree, GeometryError> {
    let triangles = provider.triangles()?;
    debug!("Indexing {} world triangles", triangles.len());
    Ok(Octree::build(triangles, config))
}
