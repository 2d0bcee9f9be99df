// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Seamcarve - The main object
//!
//! A `Carver` owns one primary raster and any number of auxiliary
//! rasters, and drives them through a resize one seam at a time.  Each
//! axis is handled in its own pass: orient the rasters, build the maps
//! once, then alternate between tracing a seam and repairing the maps
//! around it.
//!
//! Enlargement has no seams of its own to follow.  Each enlargement
//! sub-pass clones the primary raster, shrinks the clone by as many
//! seams as the sub-pass will insert, and duplicates those seams in the
//! original, in the columns they were found at.  A larger enlargement
//! runs several sub-passes, each with a fresh clone, so an inserted
//! seam is never duplicated again within the same sub-pass.

use crate::config::{Axis, CarverConfig, ResizeOrder};
use crate::dump::energy_image;
use crate::energy::EnergyFunction;
use crate::energymap::{build_cost_map, build_energy_map, update_cost_map, update_energy_map};
use crate::error::{invalid_geometry, CarveError, Result};
use crate::flipper::orient;
use crate::grid::Grid;
use crate::mask::MaskLayer;
use crate::progress::{CancelFlag, Progress, Silent};
use crate::rigidity::RigidityTable;
use crate::seamfinder::{origin_columns, trace_seam, Seam};
use crate::seammap::{SeamMap, SeamRecorder};
use crate::twodmap::reserve;
use image::{DynamicImage, GenericImageView, GrayImage, ImageBuffer};
use log::{debug, info, trace};

/// Handle to an auxiliary raster attached to a carver.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AuxId(usize);

impl AuxId {
    /// Attachment order, starting at zero.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A content-aware resizer for one image.
pub struct Carver {
    config: CarverConfig,
    table: RigidityTable,
    grid: Grid,
    auxiliary: Vec<Grid>,
    recorder: SeamRecorder,
    progress: Box<dyn Progress>,
    cancel: CancelFlag,
    poisoned: bool,
}

impl Carver {
    /// A carver over a row-major buffer of `width * height * bpp` bytes.
    pub fn new(pixels: &[u8], width: usize, height: usize, bpp: usize, config: CarverConfig) -> Result<Self> {
        config.validate()?;
        let grid = Grid::primary(pixels, width, height, bpp)?;
        Ok(Carver {
            table: RigidityTable::new(config.rigidity, config.delta_x),
            recorder: SeamRecorder::new(width, height, config.seam_colors),
            config,
            grid,
            auxiliary: Vec::new(),
            progress: Box::new(Silent),
            cancel: CancelFlag::new(),
            poisoned: false,
        })
    }

    /// A carver over a decoded image: RGBA if it has alpha, RGB if not.
    pub fn from_image(image: &DynamicImage, config: CarverConfig) -> Result<Self> {
        let (width, height) = image.dimensions();
        let (width, height) = (width as usize, height as usize);
        if image.color().has_alpha() {
            Self::new(&image.to_rgba8().into_raw(), width, height, 4, config)
        } else {
            Self::new(&image.to_rgb8().into_raw(), width, height, 3, config)
        }
    }

    /// The current configuration.
    pub fn config(&self) -> &CarverConfig {
        &self.config
    }

    fn reconfigure(&mut self, config: CarverConfig) -> Result<()> {
        config.validate()?;
        self.table = RigidityTable::new(config.rigidity, config.delta_x);
        self.recorder.set_colors(config.seam_colors);
        self.config = config;
        Ok(())
    }

    /// Use a different energy function from the next resize on.
    pub fn set_energy_function(&mut self, energy: EnergyFunction) -> Result<()> {
        self.reconfigure(self.config.clone().with_energy(energy))
    }

    pub fn set_rigidity(&mut self, rigidity: f64) -> Result<()> {
        self.reconfigure(self.config.clone().with_rigidity(rigidity))
    }

    pub fn set_delta_x(&mut self, delta_x: usize) -> Result<()> {
        self.reconfigure(self.config.clone().with_delta_x(delta_x))
    }

    pub fn set_resize_order(&mut self, order: ResizeOrder) -> Result<()> {
        self.reconfigure(self.config.clone().with_resize_order(order))
    }

    pub fn set_enlargement_step(&mut self, step: f64) -> Result<()> {
        self.reconfigure(self.config.clone().with_enlargement_step(step))
    }

    pub fn set_carve_auxiliary(&mut self, carve: bool) -> Result<()> {
        self.reconfigure(self.config.clone().with_carve_auxiliary(carve))
    }

    pub fn set_record_seams(&mut self, record: bool) -> Result<()> {
        self.reconfigure(self.config.clone().with_record_seams(record))
    }

    pub fn set_seam_colors(&mut self, start: [u8; 4], end: [u8; 4]) -> Result<()> {
        self.reconfigure(self.config.clone().with_seam_colors(start, end))
    }

    /// Where progress goes.  Replaces any earlier sink.
    pub fn set_progress<P: Progress + 'static>(&mut self, progress: P) {
        self.progress = Box::new(progress);
    }

    /// A handle on the flag that stops a running resize.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Add `strength` times the layer's intensity to the bias of every
    /// pixel the layer covers.  Positive strengths protect, negative
    /// ones attract seams.
    pub fn bias_add(&mut self, layer: MaskLayer<'_>, strength: i32) -> Result<()> {
        layer.validate()?;
        let (width, height) = self.grid.image_dimensions();
        let orientation = self.grid.orientation();
        let maps = self.grid.maps_mut()?;
        for (x, y, intensity) in layer.overlap(width, height) {
            maps.bias[orientation.to_raster(x, y)] += f64::from(strength) * intensity;
        }
        Ok(())
    }

    /// Accumulate the layer into the rigidity mask.  Once a mask exists
    /// the rigidity penalty of every step is scaled by the mask value of
    /// the pixel stepped into; uncovered pixels scale it by zero.
    pub fn rigidity_mask_add(&mut self, layer: MaskLayer<'_>) -> Result<()> {
        layer.validate()?;
        let (width, height) = self.grid.image_dimensions();
        let orientation = self.grid.orientation();
        let mask = self.grid.rigidity_mask()?;
        for (x, y, intensity) in layer.overlap(width, height) {
            mask[orientation.to_raster(x, y)] += intensity;
        }
        Ok(())
    }

    /// Attach a raster of the current image size that will be carved
    /// with the same seams as the image.
    pub fn attach(&mut self, pixels: &[u8], bpp: usize) -> Result<AuxId> {
        let (width, height) = self.grid.image_dimensions();
        let mut raster = Grid::auxiliary(pixels, width, height, bpp)?;
        if raster.orientation() != self.grid.orientation() {
            raster.transpose()?;
        }
        self.auxiliary.push(raster);
        Ok(AuxId(self.auxiliary.len() - 1))
    }

    fn aux(&self, id: AuxId) -> Result<&Grid> {
        self.auxiliary
            .get(id.0)
            .ok_or(CarveError::UnknownRaster { index: id.0 })
    }

    /// An auxiliary raster's `(width, height)`.
    pub fn aux_dimensions(&self, id: AuxId) -> Result<(usize, usize)> {
        Ok(self.aux(id)?.image_dimensions())
    }

    /// An auxiliary raster, row-major in normal orientation.
    pub fn aux_pixels(&self, id: AuxId) -> Result<Vec<u8>> {
        self.aux(id)?.to_pixels()
    }

    /// Current image width.
    pub fn width(&self) -> usize {
        self.grid.image_dimensions().0
    }

    /// Current image height.
    pub fn height(&self) -> usize {
        self.grid.image_dimensions().1
    }

    /// Channels per pixel.
    pub fn bpp(&self) -> usize {
        self.grid.bpp()
    }

    /// The image, row-major in normal orientation.
    pub fn pixels(&self) -> Result<Vec<u8>> {
        self.grid.to_pixels()
    }

    /// The image as an `image` crate buffer of the matching color type.
    pub fn to_image(&self) -> Result<DynamicImage> {
        let (width, height) = (self.width() as u32, self.height() as u32);
        let pixels = self.pixels()?;
        let image = match self.bpp() {
            1 => ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8),
            2 => ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageLumaA8),
            3 => ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
            _ => ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8),
        };
        image.ok_or_else(|| invalid_geometry("pixel buffer does not match the image size"))
    }

    /// The seam maps recorded so far, one per axis pass.
    pub fn seam_maps(&self) -> &[SeamMap] {
        self.recorder.maps()
    }

    pub fn clear_seam_maps(&mut self) {
        self.recorder.clear();
    }

    /// The current energy of every pixel, as a grayscale image.
    pub fn energy_image(&self) -> Result<GrayImage> {
        energy_image(&self.grid, self.config.energy)
    }

    /// Resize to `width` x `height`, carving or inserting seams along
    /// each axis that changes.
    ///
    /// A raised cancel flag stops the resize between two seam steps with
    /// `Canceled`, lowering the flag; the image keeps whatever size it
    /// had reached.  Running out of memory is fatal: the carver refuses
    /// all further resizes.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        if self.poisoned {
            return Err(CarveError::Poisoned);
        }
        if width == 0 || height == 0 {
            return Err(invalid_geometry(format!(
                "cannot resize to {}x{}: both dimensions must be at least 1",
                width, height
            )));
        }
        if self.config.carve_auxiliary {
            let dimensions = self.grid.image_dimensions();
            if let Some(index) = self
                .auxiliary
                .iter()
                .position(|raster| raster.image_dimensions() != dimensions)
            {
                return Err(invalid_geometry(format!(
                    "auxiliary raster {} no longer matches the image size",
                    index
                )));
            }
        }

        info!(
            "resizing {}x{} to {}x{}",
            self.width(),
            self.height(),
            width,
            height
        );
        for &axis in self.config.resize_order.axes().iter() {
            let target = match axis {
                Axis::Width => width,
                Axis::Height => height,
            };
            if let Err(err) = self.resize_axis(axis, target) {
                if let CarveError::OutOfMemory { .. } = err {
                    self.poisoned = true;
                }
                return Err(err);
            }
        }
        info!("resized to {}x{}", self.width(), self.height());
        Ok(())
    }

    fn resize_axis(&mut self, axis: Axis, target: usize) -> Result<()> {
        let (width, height) = self.grid.image_dimensions();
        let current = match axis {
            Axis::Width => width,
            Axis::Height => height,
        };
        if current == target {
            return Ok(());
        }

        if self.config.carve_auxiliary {
            orient(&mut self.grid, &mut self.auxiliary, axis)?;
        } else {
            orient(&mut self.grid, &mut [], axis)?;
        }

        let steps = if target < current {
            current - target
        } else {
            target - current
        };
        debug!(
            "{} pass: {} -> {} ({} seams)",
            axis, current, target, steps
        );
        if self.config.record_seams {
            self.recorder.begin(axis)?;
        }
        self.progress.start(axis, steps);
        let result = if target < current {
            self.shrink(axis, steps)
        } else {
            self.enlarge(axis, steps)
        };
        self.recorder.finish();
        result?;
        self.progress.finish(axis);
        Ok(())
    }

    fn check_cancel(&self) -> Result<()> {
        if self.cancel.take() {
            debug!("resize canceled at {}x{}", self.width(), self.height());
            return Err(CarveError::Canceled);
        }
        Ok(())
    }

    fn rebuild_maps(grid: &mut Grid, energy: EnergyFunction, table: &RigidityTable) -> Result<()> {
        build_energy_map(grid, energy)?;
        build_cost_map(grid, table)
    }

    fn repair_maps(grid: &mut Grid, energy: EnergyFunction, table: &RigidityTable, seam: &Seam) -> Result<()> {
        update_energy_map(grid, energy, seam)?;
        update_cost_map(grid, table, seam)
    }

    fn shrink(&mut self, axis: Axis, steps: usize) -> Result<()> {
        let energy = self.config.energy;
        Self::rebuild_maps(&mut self.grid, energy, &self.table)?;
        for step in 0..steps {
            self.check_cancel()?;
            let seam = trace_seam(&self.grid)?;
            trace!("removing seam {} of {}: {:?}", step + 1, steps, seam.as_slice());
            self.recorder.record(&self.grid, &seam);
            self.grid.shrink_by_one(&seam);
            if self.config.carve_auxiliary {
                for raster in self.auxiliary.iter_mut() {
                    raster.shrink_by_one(&seam);
                }
            }
            if step + 1 < steps {
                Self::repair_maps(&mut self.grid, energy, &self.table, &seam)?;
            }
            self.progress.update(axis, (step + 1) as f64 / steps as f64);
        }
        Ok(())
    }

    // Shrink a scratch copy by `count` seams and report them in the
    // columns of the untouched raster.
    fn shadow_seams(&self, count: usize) -> Result<Vec<Seam>> {
        let energy = self.config.energy;
        let mut shadow = self.grid.try_clone()?;
        shadow.tag_positions()?;
        Self::rebuild_maps(&mut shadow, energy, &self.table)?;

        let mut seams = Vec::new();
        seams
            .try_reserve_exact(count)
            .map_err(|_| CarveError::OutOfMemory {
                bytes: count * std::mem::size_of::<Seam>(),
            })?;
        for i in 0..count {
            let seam = trace_seam(&shadow)?;
            seams.push(origin_columns(&shadow, &seam)?);
            if i + 1 < count {
                shadow.shrink_by_one(&seam);
                Self::repair_maps(&mut shadow, energy, &self.table, &seam)?;
            }
        }
        Ok(seams)
    }

    fn enlarge(&mut self, axis: Axis, steps: usize) -> Result<()> {
        let mut done = 0;
        while done < steps {
            let (width, height) = (self.grid.width(), self.grid.height());
            let bound = ((self.config.enlargement_step - 1.0) * width as f64).floor() as usize;
            let count = bound.max(1).min(width).min(steps - done);
            debug!(
                "{} enlargement sub-pass: {} seams at width {}",
                axis, count, width
            );

            let seams = self.shadow_seams(count)?;
            self.grid.reserve_width(width + count)?;
            if self.config.carve_auxiliary {
                for raster in self.auxiliary.iter_mut() {
                    raster.reserve_width(width + count)?;
                }
            }

            // Per row, the original columns already duplicated, sorted.
            // Each insertion left of a column pushes it one step right.
            let mut inserted: Vec<Vec<usize>> = reserve(height)?;
            for _ in 0..height {
                inserted.push(reserve(count)?);
            }
            for seam in seams.iter() {
                self.check_cancel()?;
                let mut current = reserve(height)?;
                for (&column, row) in seam.iter().zip(inserted.iter_mut()) {
                    let before = match row.binary_search(&column) {
                        Ok(i) | Err(i) => i,
                    };
                    row.insert(before, column);
                    current.push(column + before);
                }
                let current = Seam::from(current);
                trace!("inserting seam {} of {}: {:?}", done + 1, steps, current.as_slice());

                self.recorder.record(&self.grid, &current);
                self.grid.grow_by_one(&current)?;
                if self.config.carve_auxiliary {
                    for raster in self.auxiliary.iter_mut() {
                        raster.grow_by_one(&current)?;
                    }
                }
                done += 1;
                self.progress.update(axis, done as f64 / steps as f64);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn gradient(width: usize, height: usize) -> Vec<u8> {
        (0..height)
            .flat_map(|y| (0..width).flat_map(move |x| vec![(x * 20 + y * 3) as u8; 3]))
            .collect()
    }

    #[test]
    fn shrinks_and_grows_both_axes() {
        let mut carver = Carver::new(&gradient(8, 6), 8, 6, 3, CarverConfig::default()).unwrap();
        carver.resize(5, 4).unwrap();
        assert_eq!((carver.width(), carver.height()), (5, 4));
        assert_eq!(carver.pixels().unwrap().len(), 5 * 4 * 3);

        carver.resize(11, 9).unwrap();
        assert_eq!((carver.width(), carver.height()), (11, 9));
        assert_eq!(carver.pixels().unwrap().len(), 11 * 9 * 3);
    }

    #[test]
    fn zero_targets_are_rejected() {
        let mut carver = Carver::new(&gradient(4, 4), 4, 4, 3, CarverConfig::default()).unwrap();
        assert!(carver.resize(0, 4).is_err());
        assert_eq!(carver.width(), 4);
    }

    #[test]
    fn setters_validate() {
        let mut carver = Carver::new(&gradient(4, 4), 4, 4, 3, CarverConfig::default()).unwrap();
        assert!(carver.set_rigidity(-2.0).is_err());
        assert_eq!(carver.config().rigidity, 0.0);
        assert!(carver.set_enlargement_step(3.0).is_err());
        carver.set_delta_x(2).unwrap();
        assert_eq!(carver.config().delta_x, 2);
    }

    #[test]
    fn progress_reaches_one() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut carver = Carver::new(&gradient(6, 3), 6, 3, 3, CarverConfig::default()).unwrap();
        carver.set_progress(move |axis: Axis, fraction: f64| sink.borrow_mut().push((axis, fraction)));
        carver.resize(3, 3).unwrap();
        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert!(seen.windows(2).all(|w| w[0].1 <= w[1].1));
        assert_eq!(seen[2], (Axis::Width, 1.0));
    }

    #[test]
    fn enlargement_duplicates_low_energy_columns() {
        // Flat except for one hard edge, which must survive intact.
        let pixels: Vec<u8> = (0..4)
            .flat_map(|_| (0..6).map(|x| if x < 3 { 0 } else { 250 }))
            .collect();
        let mut carver = Carver::new(&pixels, 6, 4, 1, CarverConfig::default()).unwrap();
        carver.resize(8, 4).unwrap();
        let out = carver.pixels().unwrap();
        for row in out.chunks(8) {
            assert!(row.windows(2).all(|w| w[0] <= w[1]));
            assert!(row.iter().all(|&v| v == 0 || v == 250));
            assert_eq!(row.iter().filter(|&&v| v == 250).count(), 3);
        }
    }

    #[test]
    fn images_round_trip_through_the_image_crate() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(5, 3, Rgb([10, 20, 30])));
        let mut carver = Carver::from_image(&image, CarverConfig::default()).unwrap();
        assert_eq!(carver.bpp(), 3);
        carver.resize(4, 2).unwrap();
        let out = carver.to_image().unwrap().to_rgb8();
        assert_eq!(out.dimensions(), (4, 2));
        assert!(out.pixels().all(|p| *p == Rgb([10, 20, 30])));
    }

    #[test]
    fn unknown_auxiliary_handles_are_errors() {
        let carver = Carver::new(&gradient(2, 2), 2, 2, 3, CarverConfig::default()).unwrap();
        match carver.aux_pixels(AuxId(0)) {
            Err(CarveError::UnknownRaster { index: 0 }) => {}
            other => panic!("unexpected {:?}", other.map(|p| p.len())),
        }
    }
}
