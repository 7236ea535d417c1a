use super::exec::run_probe;
use super::profile::{DeadlineClass, Profile, ProbeSpec};
use super::{Field, ProbeValue};
use crate::config::DeadlineConfig;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

/// The pending result of one launched probe.
#[derive(Debug)]
pub struct ProbeHandle {
    pub field: Field,
    pub program: String,
    pub(super) result: oneshot::Receiver<ProbeValue>,
}

/// Launches every probe in `profile` on its own task. Must be called from
/// within a tokio runtime.
pub fn dispatch(profile: Profile, deadlines: &DeadlineConfig) -> Vec<ProbeHandle> {
    debug!(
        platform = ?profile.platform,
        probes = profile.probes.len(),
        "dispatching probes"
    );
    profile
        .probes
        .into_iter()
        .map(|spec| {
            let deadline = deadline_for(deadlines, spec.deadline);
            spawn_probe(spec, deadline)
        })
        .collect()
}

fn deadline_for(deadlines: &DeadlineConfig, class: DeadlineClass) -> Duration {
    match class {
        DeadlineClass::Long => deadlines.long,
        DeadlineClass::Short => deadlines.short,
    }
}

fn spawn_probe(spec: ProbeSpec, deadline: Duration) -> ProbeHandle {
    let (tx, rx) = oneshot::channel();
    let field = spec.field;
    let program = spec.program.clone();

    tokio::spawn(async move {
        let value = match run_probe(field.key(), &spec.program, &spec.args, deadline).await {
            Some(stdout) => spec.parser.parse(&stdout),
            None => ProbeValue::Absent,
        };
        // The receiver only goes away if the run itself was abandoned.
        let _ = tx.send(value);
    });

    ProbeHandle {
        field,
        program,
        result: rx,
    }
}
