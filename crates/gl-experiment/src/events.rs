//! Outbound notifications and their delivery.

use gl_core::ProcessType;
use gl_thermo::GasSnapshot;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard};

/// A recorded graph point. The pair depends on the active process.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataPoint {
    /// Isothermal: P over V.
    PressureVolume { pressure_atm: f64, volume_cm3: f64 },
    /// Isobaric: V over T.
    VolumeTemperature { volume_cm3: f64, temperature_k: f64 },
    /// Isochoric: P over T.
    PressureTemperature { pressure_atm: f64, temperature_k: f64 },
}

impl DataPoint {
    /// The point a process records for `snapshot`; `None` records nothing.
    pub fn for_process(process: ProcessType, snapshot: GasSnapshot) -> Option<Self> {
        match process {
            ProcessType::None => None,
            ProcessType::Isothermal => Some(Self::PressureVolume {
                pressure_atm: snapshot.pressure_atm,
                volume_cm3: snapshot.volume_cm3,
            }),
            ProcessType::Isobaric => Some(Self::VolumeTemperature {
                volume_cm3: snapshot.volume_cm3,
                temperature_k: snapshot.temperature_k,
            }),
            ProcessType::Isochoric => Some(Self::PressureTemperature {
                pressure_atm: snapshot.pressure_atm,
                temperature_k: snapshot.temperature_k,
            }),
        }
    }
}

/// Cue raised when the hardware sensor is pressed but may not move the piston.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputWarning {
    /// No process selected yet.
    NoModeSelected,
    /// Isochoric process: the volume is locked.
    VolumeLocked,
}

impl InputWarning {
    /// Warning for a press under `process`, if presses are not allowed there.
    pub fn for_process(process: ProcessType) -> Option<Self> {
        match process {
            ProcessType::None => Some(Self::NoModeSelected),
            ProcessType::Isochoric => Some(Self::VolumeLocked),
            ProcessType::Isothermal | ProcessType::Isobaric => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "value", rename_all = "snake_case")]
pub enum ExperimentEvent {
    MoleculeCountChanged(u32),
    VolumeChanged(f64),
    TemperatureChanged(f64),
    PressureChanged(f64),
    DataPointRecorded(DataPoint),
    ExperimentReset,
    ProcessChanged(ProcessType),
    InputWarning(InputWarning),
}

/// Observer of experiment events.
pub trait ExperimentListener: Send {
    fn on_event(&mut self, event: &ExperimentEvent);
}

impl<F> ExperimentListener for F
where
    F: FnMut(&ExperimentEvent) + Send,
{
    fn on_event(&mut self, event: &ExperimentEvent) {
        self(event)
    }
}

/// Ordered list of listeners. Delivery is synchronous and in subscription
/// order.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Box<dyn ExperimentListener>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn ExperimentListener>) {
        self.listeners.push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn publish(&mut self, event: &ExperimentEvent) {
        for listener in &mut self.listeners {
            listener.on_event(event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// In-memory listener. Clones share the same log, so keep one clone and
/// subscribe the other.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<ExperimentEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ExperimentEvent>> {
        // a panicking listener cannot leave the Vec half-written
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn events(&self) -> Vec<ExperimentEvent> {
        self.lock().clone()
    }

    pub fn drain(&self) -> Vec<ExperimentEvent> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn data_points(&self) -> Vec<DataPoint> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                ExperimentEvent::DataPointRecorded(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Most recent value of each of the four state notifications.
    pub fn last_pressure(&self) -> Option<f64> {
        self.lock().iter().rev().find_map(|e| match e {
            ExperimentEvent::PressureChanged(p) => Some(*p),
            _ => None,
        })
    }

    pub fn last_volume(&self) -> Option<f64> {
        self.lock().iter().rev().find_map(|e| match e {
            ExperimentEvent::VolumeChanged(v) => Some(*v),
            _ => None,
        })
    }

    pub fn last_temperature(&self) -> Option<f64> {
        self.lock().iter().rev().find_map(|e| match e {
            ExperimentEvent::TemperatureChanged(t) => Some(*t),
            _ => None,
        })
    }
}

impl ExperimentListener for EventLog {
    fn on_event(&mut self, event: &ExperimentEvent) {
        self.lock().push(event.clone());
    }
}

/// Forwards events to another thread. A dropped receiver is ignored.
#[derive(Debug)]
pub struct ChannelListener {
    tx: Sender<ExperimentEvent>,
}

impl ChannelListener {
    pub fn new(tx: Sender<ExperimentEvent>) -> Self {
        Self { tx }
    }
}

impl ExperimentListener for ChannelListener {
    fn on_event(&mut self, event: &ExperimentEvent) {
        let _ = self.tx.send(event.clone());
    }
}
