use std::{iter::FusedIterator, num::NonZeroU32};

use nalgebra::{Point2, Vector2};

use crate::geometry::{ScreenBlock, ScreenPoint, ScreenSize};

pub trait ScreenBlockExt {
    fn from_size(size: ScreenSize) -> Self;
    fn is_empty(&self) -> bool;
    fn area(&self) -> u32;
    fn internal_points(&self) -> InternalPoints;
    fn spiral_chunks(&self, chunk_size: NonZeroU32) -> SpiralChunks;

    /// Tiles to render, in the order they should be rendered.
    fn tile_ordering(&self, tile_size: NonZeroU32) -> Vec<ScreenBlock> {
        self.spiral_chunks(tile_size).collect()
    }
}

impl ScreenBlockExt for ScreenBlock {
    fn from_size(size: ScreenSize) -> Self {
        ScreenBlock::new(ScreenPoint::origin(), ScreenPoint::from(size))
    }

    fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    fn area(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            self.width() * self.height()
        }
    }

    /// Create an iterator over coordinates (x, y) pairs inside the block,
    /// in C order (x changes first, then y)
    fn internal_points(&self) -> InternalPoints {
        if self.is_empty() {
            InternalPoints::empty()
        } else {
            InternalPoints {
                min_x: self.min.x,
                max: self.max,

                cursor: self.min,
            }
        }
    }

    /// Create an iterator over sub blocks in (roughly) spiral order, starting in the middle of the block.
    /// Chunks are chunk_size * chunk_size large, except on the bottom and right side of the
    /// block, where they may be clipped if chunk size doesn't evenly divide block size.
    fn spiral_chunks(&self, chunk_size: NonZeroU32) -> SpiralChunks {
        if self.is_empty() {
            return SpiralChunks::empty();
        }

        let chunk_size = chunk_size.get();
        let size = self
            .size()
            .map(|x| x.div_ceil(chunk_size) as i32);
        let cursor = Point2::from(size / 2);

        let dx = 2 * cursor.y - size.y;
        debug_assert!(dx == 0 || dx == -1);
        let direction = Vector2::new(dx, -1 - dx);

        SpiralChunks {
            block: self.clone(),

            chunk_size,
            size,
            cursor,
            direction,

            segment: 2,
            segment_remaining: 1,
            remaining: (size.x * size.y) as u32,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct InternalPoints {
    min_x: u32,
    max: ScreenPoint,

    cursor: ScreenPoint,
}

impl InternalPoints {
    // Construct an iterator over internal points that returns no points
    fn empty() -> Self {
        InternalPoints {
            min_x: 1,
            max: Point2::origin(),

            cursor: Point2::origin(),
        }
    }
}

impl Iterator for InternalPoints {
    type Item = ScreenPoint;

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.len();
        (len, Some(len))
    }

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.y >= self.max.y {
            return None;
        }

        let ret = self.cursor;

        debug_assert!(self.cursor.x < self.max.x);
        self.cursor.x += 1;
        if self.cursor.x >= self.max.x {
            self.cursor.x = self.min_x;
            self.cursor.y += 1;
        }

        Some(ret)
    }
}

impl ExactSizeIterator for InternalPoints {
    fn len(&self) -> usize {
        if self.cursor.y >= self.max.y {
            0
        } else {
            let whole_rows = ScreenBlock::new(Point2::new(self.min_x, self.cursor.y + 1), self.max);
            let current_row = ScreenBlock::new(self.cursor, Point2::new(self.max.x, self.cursor.y + 1));
            (whole_rows.area() + current_row.area()) as usize
        }
    }
}

impl FusedIterator for InternalPoints {}

/// Iterator over (mostly) square blocks within a rectangular box in spiral order.
#[derive(Clone, Debug)]
pub struct SpiralChunks {
    block: ScreenBlock,

    chunk_size: u32,
    /// Size of the block in chunks
    size: Vector2<i32>,
    /// Position in chunks
    cursor: Point2<i32>,
    direction: Vector2<i32>,

    segment: u32,
    segment_remaining: i32,
    remaining: u32,
}

impl SpiralChunks {
    /// Constructs an iterator that returns no blocks.
    fn empty() -> SpiralChunks {
        SpiralChunks {
            block: ScreenBlock::new(Point2::origin(), Point2::origin()),

            chunk_size: 0,
            size: Vector2::zeros(),
            cursor: Point2::origin(),
            direction: Vector2::new(1, 0),

            segment: 0,
            segment_remaining: 0,
            remaining: 0,
        }
    }

    /// Moves to next segment of the spiral (turns 90 degrees and calculates new segment length).
    fn next_segment(&mut self) {
        self.direction = Vector2::new(self.direction.y, -self.direction.x);
        self.segment += 1;
        self.segment_remaining = (self.segment / 2) as i32;
    }

    fn contains_chunk(&self, chunk: &Point2<i32>) -> bool {
        chunk.x >= 0 && chunk.y >= 0 && chunk.x < self.size.x && chunk.y < self.size.y
    }

    /// Returns a new screen block that corresponds to the current iterator position.
    fn current_block(&self) -> ScreenBlock {
        let min = self.block.min + self.cursor.coords.map(|x| x as u32) * self.chunk_size;
        let max = min + Vector2::repeat(self.chunk_size);
        let ret = ScreenBlock::new(min, self.block.max.inf(&max));
        debug_assert!(!ret.is_empty());
        ret
    }
}

impl Iterator for SpiralChunks {
    type Item = ScreenBlock;

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let ret = self.current_block();

        if self.segment_remaining == 0 {
            self.next_segment();
        }

        let new_cursor = self.cursor + self.direction;
        self.segment_remaining -= 1;

        if self.contains_chunk(&new_cursor) {
            // We're inside boundaries and can continue
            self.cursor = new_cursor;
        } else {
            // Got outside of the area.
            // In this case we don't move the cursor and instead
            // turn to new segment immediately.
            self.next_segment();

            // Then we skip the whole next segment (it would be outside the area anyway)
            self.cursor += self.direction * self.segment_remaining;

            // And finally we turn to the next segment which is inside the area
            // Note that segment_remaining for this one is wrong (since we skipped
            // its part outside of the screen), but we will terminate through this branch
            // of the iterator again, so it's not a problem and we don't need to fix it.
            self.next_segment();
        }

        self.remaining -= 1;

        Some(ret)
    }
}

impl ExactSizeIterator for SpiralChunks {
    fn len(&self) -> usize {
        self.remaining as usize
    }
}

impl FusedIterator for SpiralChunks {}
