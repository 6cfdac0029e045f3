/// Grid geometry: `n` interior cells per axis plus a one-cell boundary ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    pub n: usize,
    /// Row length including the boundary ring (`n + 2`).
    pub stride: usize,
    /// Total cells per buffer (`(n + 2)²`).
    pub size: usize,
}

impl Grid {
    pub fn new(n: usize) -> Self {
        let stride = n + 2;
        Self { n, stride, size: stride * stride }
    }

    /// Linear index of cell `(i, j)`, where `i` is the column and `j` the row.
    #[inline(always)]
    pub fn idx(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.stride && j < self.stride, "cell ({i}, {j}) outside {}x{} grid", self.stride, self.stride);
        i + self.stride * j
    }

    /// Inverse of [`Grid::idx`].
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.stride, index / self.stride)
    }

    /// Physical width of one cell.
    pub fn cell_size(&self, length_scale: f64) -> f64 {
        length_scale / self.n as f64
    }

    /// Physical centre of cell `(i, j)`. Interior cell 1 spans `[0, h]`.
    pub fn cell_center(&self, i: usize, j: usize, length_scale: f64) -> (f64, f64) {
        let h = self.cell_size(length_scale);
        ((i as f64 - 0.5) * h, (j as f64 - 0.5) * h)
    }

    /// Sum of a field over interior cells.
    pub fn interior_sum(&self, field: &[f64]) -> f64 {
        let mut sum = 0.0;
        for j in 1..=self.n {
            for i in 1..=self.n {
                sum += field[self.idx(i, j)];
            }
        }
        sum
    }
}

/// The four simulated channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    XVelocity,
    YVelocity,
    Density,
    /// Temperature excess over the ambient air temperature.
    Temperature,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::XVelocity, Channel::YVelocity, Channel::Density, Channel::Temperature];
}

/// One generation of the four channels.
#[derive(Clone, Debug)]
pub struct Fields<T = f64> {
    pub vx: Vec<T>,
    pub vy: Vec<T>,
    pub density: Vec<T>,
    pub temperature: Vec<T>,
}

impl Fields {
    pub fn zeroed(size: usize) -> Self {
        Self::filled(size, 0.0)
    }
}

impl<T: Clone> Fields<T> {
    pub fn filled(size: usize, value: T) -> Self {
        Self {
            vx: vec![value.clone(); size],
            vy: vec![value.clone(); size],
            density: vec![value.clone(); size],
            temperature: vec![value; size],
        }
    }

    pub fn get(&self, channel: Channel) -> &[T] {
        match channel {
            Channel::XVelocity => &self.vx,
            Channel::YVelocity => &self.vy,
            Channel::Density => &self.density,
            Channel::Temperature => &self.temperature,
        }
    }

    pub fn get_mut(&mut self, channel: Channel) -> &mut [T] {
        match channel {
            Channel::XVelocity => &mut self.vx,
            Channel::YVelocity => &mut self.vy,
            Channel::Density => &mut self.density,
            Channel::Temperature => &mut self.temperature,
        }
    }

    pub fn fill(&mut self, value: T) {
        for channel in Channel::ALL {
            self.get_mut(channel).fill(value.clone());
        }
    }
}

/// Storage for all three generations of every channel of one simulation.
#[derive(Clone, Debug)]
pub struct FieldStore {
    /// State after the most recent step.
    pub current: Fields,
    /// Input to the step in progress; equals `current` between steps.
    pub previous: Fields,
    /// Staged additions consumed and cleared by the next step.
    pub source: Fields,
    /// Staged set-points: a `Some` cell is pinned to that value by the next
    /// step, overriding any addition staged for it.
    pub held: Fields<Option<f64>>,
}

impl FieldStore {
    pub fn new(grid: &Grid) -> Self {
        Self {
            current: Fields::zeroed(grid.size),
            previous: Fields::zeroed(grid.size),
            source: Fields::zeroed(grid.size),
            held: Fields::filled(grid.size, None),
        }
    }
}
