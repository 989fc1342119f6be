/**
 * The queue of waypoints the car still has to visit. Points are appended at
 * the write position and consumed at the read position; a consumed point is
 * never handed out again until the path is cleared and refilled.
 */
use crate::error::PathError;
use crate::geometry::Point;

pub struct Path {
    points: Vec<Point>,
    capacity: usize,
    read_position: usize,
}


impl Path {
    pub fn new(capacity: usize) -> Path {
        Path {
            points: Vec::with_capacity(capacity),
            capacity,
            read_position: 0,
        }
    }

    /**
     * Adds a point to the end of the path. A full path is left unchanged and
     * the caller gets `PathError::Full`.
     */
    pub fn append(&mut self, point: Point) -> Result<(), PathError> {
        if self.points.len() >= self.capacity {
            return Err(PathError::Full { capacity: self.capacity });
        }
        self.points.push(point);
        Ok(())
    }

    /// Returns the next unvisited point and moves past it.
    pub fn consume_next(&mut self) -> Option<Point> {
        let point = self.points.get(self.read_position).copied()?;
        self.read_position += 1;
        Some(point)
    }

    pub fn has_pending(&self) -> bool {
        self.read_position < self.points.len()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.read_position = 0;
    }

    /// The most recently consumed point.
    pub fn last_consumed(&self) -> Option<Point> {
        self.read_position
            .checked_sub(1)
            .and_then(|index| self.points.get(index).copied())
    }

    pub fn pending(&self) -> usize {
        self.points.len() - self.read_position
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn read_position(&self) -> usize {
        self.read_position
    }

    pub fn write_position(&self) -> usize {
        self.points.len()
    }
}
