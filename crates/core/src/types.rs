/// Host-assigned plant identifier (e.g. `plant.monstera`).
pub type PlantId = String;

/// Host device registry identifier owning a plant.
pub type DeviceId = String;
