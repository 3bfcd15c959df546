//! Wiring of catalog, aggregators, event bus and global registry.
//!
//! [`PlantMonitor`] owns one [`PlantAggregator`] per registered plant and
//! applies [`FeedCommand`]s to them. Every command that touches a plant's
//! inputs runs a full update cycle for that plant.

use std::collections::HashMap;
use std::sync::Arc;

use plant_monitor_core::{
    CoreError, PlantAggregator, PlantCatalog, PlantDefinition, PlantId, PlantSnapshot,
    SensorInputs,
};
use plant_monitor_events::{EventBus, GlobalProblemRegistry, GlobalProblemStatus};

use crate::feed::FeedCommand;

pub struct PlantMonitor {
    bus: Arc<EventBus>,
    catalog: Arc<PlantCatalog>,
    plants: HashMap<PlantId, PlantAggregator<SensorInputs>>,
    registry: GlobalProblemRegistry<PlantCatalog>,
}

impl PlantMonitor {
    pub fn new(event_bus_capacity: usize) -> Self {
        let bus = Arc::new(EventBus::new(event_bus_capacity));
        let catalog = Arc::new(PlantCatalog::new());
        let registry = GlobalProblemRegistry::new(Arc::clone(&catalog), Arc::clone(&bus));
        Self {
            bus,
            catalog,
            plants: HashMap::new(),
            registry,
        }
    }

    /// Register every definition, then refresh membership once.
    ///
    /// Invalid definitions are rejected before anything is registered. If a
    /// registration conflicts, the plants inserted before it stay loaded and
    /// membership still reflects them.
    pub fn load(&mut self, definitions: Vec<PlantDefinition>) -> Result<(), CoreError> {
        for definition in &definitions {
            definition.check()?;
        }
        let result = definitions
            .into_iter()
            .try_for_each(|definition| self.insert_plant(definition));

        self.registry.refresh_membership();
        self.update_all();
        result
    }

    /// Register a plant at runtime.
    pub fn register(&mut self, definition: PlantDefinition) -> Result<(), CoreError> {
        let plant_id = definition.id.clone();
        self.insert_plant(definition)?;
        self.registry.refresh_membership();
        if let Some(aggregator) = self.plants.get_mut(&plant_id) {
            aggregator.update();
        }
        Ok(())
    }

    pub fn unregister(&mut self, plant_id: &PlantId) -> Result<(), CoreError> {
        self.catalog.unregister(plant_id)?;
        self.plants.remove(plant_id);
        self.registry.refresh_membership();
        Ok(())
    }

    /// Apply one feed command.
    pub fn apply(&mut self, command: FeedCommand) -> Result<(), CoreError> {
        match command {
            FeedCommand::Reading {
                plant,
                metric,
                value,
            } => {
                self.with_plant(&plant, |agg| {
                    agg.sensors_mut().set_reading(metric, value);
                })?;
            }
            FeedCommand::Threshold {
                plant,
                metric,
                bound,
                value,
            } => {
                self.with_plant(&plant, |agg| {
                    agg.sensors_mut().set_threshold(metric, bound, value);
                })?;
            }
            FeedCommand::Trigger {
                plant,
                metric,
                enabled,
            } => {
                self.with_plant(&plant, |agg| {
                    agg.sensors_mut().set_trigger(metric, enabled);
                })?;
            }
            FeedCommand::Register { plant } => self.register(plant)?,
            FeedCommand::Unregister { plant } => self.unregister(&plant)?,
            FeedCommand::Rename { plant, name } => {
                self.catalog.rename(&plant, name)?;
                tracing::info!(plant_id = %plant, "Plant renamed");
            }
        }
        Ok(())
    }

    /// Drain change notifications into the global registry.
    pub fn process_notifications(&mut self) -> Option<GlobalProblemStatus> {
        self.registry.process_notifications()
    }

    pub fn status(&self) -> GlobalProblemStatus {
        self.registry.status()
    }

    pub fn snapshot(&self, plant_id: &PlantId) -> Option<PlantSnapshot> {
        self.plants.get(plant_id).map(PlantAggregator::snapshot)
    }

    pub fn registry(&self) -> &GlobalProblemRegistry<PlantCatalog> {
        &self.registry
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Detach from the bus and forget all plants.
    pub fn shutdown(&mut self) {
        self.registry.shutdown();
        self.plants.clear();
    }

    fn insert_plant(&mut self, definition: PlantDefinition) -> Result<(), CoreError> {
        definition.check()?;
        let aggregator = PlantAggregator::new(
            definition.id.clone(),
            SensorInputs::from_definition(&definition),
        )
        .with_sink(self.bus.clone());

        self.catalog.register(
            definition.id.clone(),
            definition.name,
            definition.device_id,
            aggregator.shared_snapshot(),
        )?;
        self.plants.insert(definition.id, aggregator);
        Ok(())
    }

    fn update_all(&mut self) {
        for aggregator in self.plants.values_mut() {
            aggregator.update();
        }
    }

    fn with_plant(
        &mut self,
        plant_id: &PlantId,
        f: impl FnOnce(&mut PlantAggregator<SensorInputs>),
    ) -> Result<(), CoreError> {
        let aggregator = self
            .plants
            .get_mut(plant_id)
            .ok_or_else(|| CoreError::NotFound(plant_id.clone()))?;
        f(aggregator);
        aggregator.update();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use plant_monitor_core::{Metric, MetricStatus, PlantState, Reading};

    use super::*;

    fn reading(plant: &str, metric: Metric, value: f64) -> FeedCommand {
        FeedCommand::Reading {
            plant: plant.into(),
            metric,
            value: Reading::Value(value),
        }
    }

    fn monitor_with(ids: &[&str]) -> PlantMonitor {
        let mut monitor = PlantMonitor::new(64);
        monitor
            .load(ids.iter().map(|id| PlantDefinition::new(*id, *id)).collect())
            .unwrap();
        monitor
    }

    #[test]
    fn load_tracks_every_plant() {
        let monitor = monitor_with(&["plant.a", "plant.b"]);
        assert_eq!(monitor.registry().tracked_plants().len(), 2);
        assert_eq!(monitor.status().detail.total_plants, 2);
        assert!(!monitor.status().any_problem);
    }

    #[test]
    fn reading_runs_update_cycle() {
        let mut monitor = monitor_with(&["plant.a"]);
        monitor.apply(reading("plant.a", Metric::Moisture, 10.0)).unwrap();

        let snap = monitor.snapshot(&"plant.a".into()).unwrap();
        assert_eq!(snap.state, PlantState::Problem);
        assert_eq!(snap.statuses[&Metric::Moisture], Some(MetricStatus::Low));
    }

    #[test]
    fn disabling_trigger_clears_problem() {
        let mut monitor = monitor_with(&["plant.a"]);
        monitor.apply(reading("plant.a", Metric::Moisture, 10.0)).unwrap();
        monitor
            .apply(FeedCommand::Trigger {
                plant: "plant.a".into(),
                metric: Metric::Moisture,
                enabled: false,
            })
            .unwrap();

        let snap = monitor.snapshot(&"plant.a".into()).unwrap();
        assert_eq!(snap.state, PlantState::Ok);
        assert_eq!(snap.statuses[&Metric::Moisture], Some(MetricStatus::Low));
    }

    #[test]
    fn unknown_plant_is_not_found() {
        let mut monitor = monitor_with(&[]);
        assert_matches!(
            monitor.apply(reading("plant.ghost", Metric::Moisture, 10.0)),
            Err(CoreError::NotFound(_))
        );
    }

    #[test]
    fn duplicate_register_conflicts() {
        let mut monitor = monitor_with(&["plant.a"]);
        assert_matches!(
            monitor.register(PlantDefinition::new("plant.a", "Again")),
            Err(CoreError::Conflict(_))
        );
        assert_eq!(monitor.registry().tracked_plants().len(), 1);
    }

    #[test]
    fn invalid_definition_is_rejected() {
        let mut monitor = monitor_with(&[]);
        assert_matches!(
            monitor.register(PlantDefinition::new("plant.a", "")),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn load_rejects_invalid_definition_before_registering_any() {
        let mut monitor = PlantMonitor::new(64);
        let result = monitor.load(vec![
            PlantDefinition::new("plant.a", "A"),
            PlantDefinition::new("plant.b", ""),
        ]);
        assert_matches!(result, Err(CoreError::Validation(_)));
        assert!(monitor.snapshot(&"plant.a".into()).is_none());
        assert!(monitor.registry().tracked_plants().is_empty());
    }

    #[test]
    fn load_conflict_keeps_membership_in_step() {
        let mut monitor = monitor_with(&["plant.a"]);
        let result = monitor.load(vec![
            PlantDefinition::new("plant.b", "B"),
            PlantDefinition::new("plant.a", "A again"),
        ]);
        assert_matches!(result, Err(CoreError::Conflict(_)));

        let tracked: Vec<&str> = monitor
            .registry()
            .tracked_plants()
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(tracked, vec!["plant.a", "plant.b"]);
        assert_eq!(monitor.status().detail.total_plants, 2);
        assert!(monitor.snapshot(&"plant.b".into()).is_some());
    }

    #[test]
    fn shutdown_detaches_registry() {
        let mut monitor = monitor_with(&["plant.a"]);
        assert_eq!(monitor.bus().receiver_count(), 1);
        monitor.shutdown();
        assert_eq!(monitor.bus().receiver_count(), 0);
        assert!(monitor.registry().tracked_plants().is_empty());
    }
}
