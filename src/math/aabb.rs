use glam::DVec3;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AABB {
    pub min: DVec3,
    pub max: DVec3,
}

impl AABB {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Bounds of the finite points in `points`, or `None` when there are none.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a DVec3>) -> Option<Self> {
        points
            .into_iter()
            .filter(|p| p.is_finite())
            .fold(None, |acc: Option<AABB>, &p| match acc {
                Some(b) => Some(b.union(&AABB::new(p, p))),
                None => Some(AABB::new(p, p)),
            })
    }

    pub fn union(&self, other: &AABB) -> AABB {
        AABB {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    pub fn volume(&self) -> f64 {
        let d = self.size();
        d.x * d.y * d.z
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: DVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Largest extent along any axis; used to scale tolerances.
    pub fn diagonal(&self) -> f64 {
        self.size().length()
    }
}
