use crossbeam_channel::{unbounded, Receiver, Sender};

use super::{BoundaryPrims, BoundaryValues, CellCenteredBoundary};
use crate::array::FieldArray;

/// One side of a ghost-zone exchange: a sender into the neighbor's mailbox
/// and a receiver for the neighbor's payloads. Buffers are owned and
/// transferred, never shared; the recipient keeps a payload staged until its
/// set-boundaries task consumes it.
///
struct Link {
    send: Sender<Vec<f64>>,
    recv: Receiver<Vec<f64>>,
}

/// An in-process ghost-zone exchange for a 1-D chain of blocks, built on
/// crossbeam channels. Each block sends the `nghost` interior zones adjacent
/// to each end and fills its ghost zones from the matching payloads of its
/// neighbors. One payload per side crosses a channel per stage; the stage
/// barrier of the outer driver keeps the streams in lockstep, so no sequence
/// numbers are needed.
///
/// Receives never block: a poll that finds the mailbox empty reports the
/// stage incomplete and the executor retries on a later sweep.
///
pub struct ChainExchange {
    nghost: usize,
    left: Option<Link>,
    right: Option<Link>,
    staged_left: Option<Vec<f64>>,
    staged_right: Option<Vec<f64>>,
}

impl ChainExchange {
    /// An exchange with no neighbors at all; every receive completes
    /// immediately.
    ///
    pub fn solitary(nghost: usize) -> Self {
        Self {
            nghost,
            left: None,
            right: None,
            staged_left: None,
            staged_right: None,
        }
    }

    /// Wire up a periodic chain of `n` blocks. Element `i` of the returned
    /// vector talks to elements `i - 1` and `i + 1`, modulo `n`.
    ///
    pub fn periodic_chain(n: usize, nghost: usize) -> Vec<Self> {
        let mut exchanges: Vec<Self> = (0..n).map(|_| Self::solitary(nghost)).collect();

        for i in 0..n {
            let j = (i + 1) % n;
            let (to_right, from_left) = unbounded();
            let (to_left, from_right) = unbounded();

            exchanges[i].right = Some(Link {
                send: to_right,
                recv: from_right,
            });
            exchanges[j].left = Some(Link {
                send: to_left,
                recv: from_left,
            });
        }
        exchanges
    }

    fn poll(link: &Option<Link>, staged: &mut Option<Vec<f64>>) -> bool {
        match link {
            None => true,
            Some(link) => {
                if staged.is_none() {
                    *staged = link.recv.try_recv().ok();
                }
                staged.is_some()
            }
        }
    }
}

impl CellCenteredBoundary for ChainExchange {
    fn send_boundary_buffers(&mut self, var: &FieldArray) {
        let nf = var.num_fields();
        let nz = var.num_zones();
        let ng = self.nghost;

        if let Some(link) = &self.left {
            link.send
                .send(var.data()[ng * nf..2 * ng * nf].to_vec())
                .expect("neighbor mailbox was dropped");
        }
        if let Some(link) = &self.right {
            link.send
                .send(var.data()[(nz - 2 * ng) * nf..(nz - ng) * nf].to_vec())
                .expect("neighbor mailbox was dropped");
        }
    }

    fn receive_boundary_buffers(&mut self) -> bool {
        let left = Self::poll(&self.left, &mut self.staged_left);
        let right = Self::poll(&self.right, &mut self.staged_right);
        left && right
    }

    fn set_boundaries(&mut self, var: &mut FieldArray) {
        let nf = var.num_fields();
        let nz = var.num_zones();
        let ng = self.nghost;

        if let Some(payload) = self.staged_left.take() {
            var.data_mut()[..ng * nf].copy_from_slice(&payload);
        }
        if let Some(payload) = self.staged_right.take() {
            var.data_mut()[(nz - ng) * nf..].copy_from_slice(&payload);
        }
    }
}

/// Block-level boundary state for a member of a 1-D chain: no refinement
/// interfaces, no shearing box, and periodic ends, so the physical boundary
/// kernels have nothing to do. Neighbor probes report the sides that carry a
/// link.
///
pub struct LocalDomain {
    pub has_left: bool,
    pub has_right: bool,
}

impl LocalDomain {
    pub fn periodic() -> Self {
        Self {
            has_left: true,
            has_right: true,
        }
    }

    pub fn isolated() -> Self {
        Self {
            has_left: false,
            has_right: false,
        }
    }
}

impl BoundaryValues for LocalDomain {
    fn start_receiving(&mut self) {}

    fn clear_boundary(&mut self) {}

    fn apply_physical_boundaries(&mut self, _time: f64, _dt: f64, _prim: BoundaryPrims<'_>) {}

    fn nblevel(&self, k: usize, j: usize, i: usize) -> i64 {
        let present = match (k, j, i) {
            (1, 1, 0) => self.has_left,
            (1, 1, 2) => self.has_right,
            (1, 1, 1) => true,
            _ => false,
        };
        if present {
            0
        } else {
            -1
        }
    }
}
