#![allow(dead_code)]

use spectrum_core::band::DeviceClass;
use spectrum_core::request::Request;

/// Builds a request stream with sequential ids; arrivals must be pushed in order.
#[derive(Debug, Default, Clone)]
pub struct RequestStream {
    requests: Vec<Request>,
}

impl RequestStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, arrival: u64, node: usize, bandwidth_mhz: u32, class: DeviceClass) -> Self {
        let id = self.requests.len();
        self.requests
            .push(Request::new(id, arrival, node, bandwidth_mhz, class));
        self
    }

    pub fn push_lease(
        mut self,
        arrival: u64,
        node: usize,
        bandwidth_mhz: u32,
        class: DeviceClass,
        hold: u64,
    ) -> Self {
        let id = self.requests.len();
        self.requests
            .push(Request::new(id, arrival, node, bandwidth_mhz, class).with_hold(hold));
        self
    }

    pub fn build(self) -> Vec<Request> {
        self.requests
    }
}

/// Deterministic busy stream: one request every `spacing` minutes, cycling through
/// nodes, classes, bandwidths and lease lengths so leases, renewals and arrivals
/// interleave.
pub fn churn_stream(count: usize, spacing: u64, nodes: usize) -> Vec<Request> {
    const CLASSES: [DeviceClass; 3] = [DeviceClass::FiveG, DeviceClass::Iot, DeviceClass::Federal];
    const BANDWIDTHS: [u32; 4] = [100, 40, 20, 200];
    const HOLDS: [Option<u64>; 3] = [Some(500), None, Some(2_000)];

    (0..count)
        .map(|i| {
            let request = Request::new(
                i,
                i as u64 * spacing,
                (i * 7) % nodes,
                BANDWIDTHS[i % BANDWIDTHS.len()],
                CLASSES[i % CLASSES.len()],
            );
            match HOLDS[i % HOLDS.len()] {
                Some(hold) => request.with_hold(hold),
                None => request,
            }
        })
        .collect()
}
