use crate::vehicle::Vehicle;
use crate::VehicleId;

/// The live vehicles, stored densely in no particular order.
#[derive(Clone, Debug, Default)]
pub struct Fleet {
    vehicles: Vec<Vehicle>,
}

impl Fleet {
    /// Creates an empty fleet with room for `capacity` vehicles.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vehicles: Vec::with_capacity(capacity),
        }
    }

    /// The number of live vehicles.
    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Adds a vehicle.
    pub(crate) fn push(&mut self, vehicle: Vehicle) {
        self.vehicles.push(vehicle);
    }

    /// Returns an iterator over the live vehicles.
    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Vehicle> {
        self.vehicles.iter_mut()
    }

    /// Gets the vehicle with the given ID.
    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id() == id)
    }

    /// Removes every vehicle marked for despawning, calling `on_remove` with each.
    /// Returns the number of vehicles removed.
    ///
    /// Each removal moves the last vehicle into the vacated slot, so the order
    /// of the remaining vehicles is not preserved.
    pub(crate) fn despawn_marked(&mut self, mut on_remove: impl FnMut(&Vehicle)) -> usize {
        let mut removed = 0;
        let mut idx = 0;
        while idx < self.vehicles.len() {
            if self.vehicles[idx].is_marked() {
                // The vehicle swapped into `idx` is examined on the next pass
                let vehicle = self.vehicles.swap_remove(idx);
                on_remove(&vehicle);
                removed += 1;
            } else {
                idx += 1;
            }
        }
        removed
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::network::RoadNetwork;
    use crate::route::RouteTemplate;
    use crate::segment::SegmentAttributes;
    use crate::vehicle::DespawnReason;
    use std::rc::Rc;

    fn fleet(n: u64) -> Fleet {
        let network = RoadNetwork::from_attributes(&[SegmentAttributes {
            id: "a".into(),
            points: vec![[0.0, 0.0, 0.0], [100.0, 0.0, 0.0]],
            avg_speed_mph: 20.0,
            free_flow_speed_mph: 25.0,
            ..Default::default()
        }]);
        let route = Rc::new(RouteTemplate::new(vec!["a".into()], &network).unwrap());
        let segment = network.get("a").unwrap();
        let mut fleet = Fleet::default();
        for id in 0..n {
            fleet.push(Vehicle::new(VehicleId(id), route.clone(), 100.0, segment));
        }
        fleet
    }

    fn mark(fleet: &mut Fleet, ids: &[u64]) {
        for vehicle in fleet.iter_mut() {
            if ids.contains(&vehicle.id().0) {
                vehicle.mark(DespawnReason::Completed);
            }
        }
    }

    #[test]
    fn removes_adjacent_and_trailing_marks() {
        let mut fleet = fleet(6);
        // The last vehicle is swapped into a marked slot and is itself marked
        mark(&mut fleet, &[1, 2, 5]);
        let mut seen = vec![];
        let removed = fleet.despawn_marked(|v| seen.push(v.id().0));
        seen.sort();
        assert_eq!(removed, 3);
        assert_eq!(seen, [1, 2, 5]);
        assert_eq!(fleet.len(), 3);
        let mut left = fleet.iter().map(|v| v.id().0).collect::<Vec<_>>();
        left.sort();
        assert_eq!(left, [0, 3, 4]);
        assert!(fleet.iter().all(|v| !v.is_marked()));
    }

    #[test]
    fn removes_everything() {
        let mut fleet = fleet(4);
        mark(&mut fleet, &[0, 1, 2, 3]);
        assert_eq!(fleet.despawn_marked(|_| {}), 4);
        assert!(fleet.is_empty());
    }

    #[test]
    fn nothing_marked() {
        let mut fleet = fleet(3);
        assert_eq!(fleet.despawn_marked(|_| {}), 0);
        assert_eq!(fleet.len(), 3);
        assert!(fleet.get(VehicleId(2)).is_some());
        assert!(fleet.get(VehicleId(9)).is_none());
    }
}
