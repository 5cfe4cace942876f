use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;

const GRAVITY: f64 = 6.0;
const CONFETTI: [char; 6] = ['*', '+', '❄', '✦', '•', '✧'];
const GREETINGS: [&str; 4] = ["MERRY!", "HO HO HO!", "JOLLY!", "WELL DONE!"];

#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    pub age: f64,
    pub max_age: f64,
    /// Part of the greeting; flies to its target and stays.
    pub is_text: bool,
    pub target_x: f64,
    pub target_y: f64,
}

impl Particle {
    fn confetti<R: Rng + ?Sized>(x: f64, y: f64, rng: &mut R) -> Self {
        Self {
            x,
            y,
            vel_x: rng.gen_range(-2.0..2.0),
            vel_y: rng.gen_range(0.5..3.0),
            symbol: *CONFETTI.choose(rng).unwrap_or(&'*'),
            color_index: rng.gen_range(0..7),
            age: 0.0,
            max_age: rng.gen_range(2.0..4.0),
            is_text: false,
            target_x: x,
            target_y: y,
        }
    }

    fn letter<R: Rng + ?Sized>(
        from: (f64, f64),
        target: (f64, f64),
        symbol: char,
        rng: &mut R,
    ) -> Self {
        Self {
            x: from.0,
            y: from.1,
            vel_x: target.0 - from.0,
            vel_y: target.1 - from.1,
            symbol,
            color_index: rng.gen_range(0..7),
            age: 0.0,
            max_age: rng.gen_range(3.0..5.0),
            is_text: true,
            target_x: target.0,
            target_y: target.1,
        }
    }

    fn update(&mut self, dt: f64) -> bool {
        if self.is_text {
            let dist = ((self.target_x - self.x).powi(2) + (self.target_y - self.y).powi(2)).sqrt();
            if dist > 1.0 {
                self.x += self.vel_x * dt;
                self.y += self.vel_y * dt;
            } else {
                self.x = self.target_x;
                self.y = self.target_y;
                self.vel_x = 0.0;
                self.vel_y = 0.0;
            }
        } else {
            self.x += self.vel_x * dt;
            self.y += self.vel_y * dt;
            self.vel_y += GRAVITY * dt;
        }

        self.age += dt;
        self.age < self.max_age
    }
}

/// Confetti shown over the results after a full run.
#[derive(Debug)]
pub struct Celebration {
    pub particles: Vec<Particle>,
    pub is_active: bool,
    elapsed: Duration,
    duration: Duration,
    width: f64,
    height: f64,
}

impl Celebration {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            is_active: false,
            elapsed: Duration::ZERO,
            duration: Duration::from_secs(4),
            width: 80.0,
            height: 24.0,
        }
    }

    pub fn start<R: Rng + ?Sized>(&mut self, width: u16, height: u16, rng: &mut R) {
        self.particles.clear();
        self.elapsed = Duration::ZERO;
        self.is_active = true;
        self.width = width as f64;
        self.height = height as f64;

        let center_x = self.width / 2.0;
        let center_y = self.height / 2.0;
        let greeting = GREETINGS.choose(rng).unwrap_or(&"MERRY!");

        let spacing = 2.0;
        let start_x = center_x - (greeting.chars().count() as f64 - 1.0) * spacing / 2.0;
        for (i, ch) in greeting.chars().enumerate().filter(|(_, c)| *c != ' ') {
            let from = (
                center_x + rng.gen_range(-10.0..10.0),
                center_y + rng.gen_range(-5.0..5.0),
            );
            let target = (start_x + i as f64 * spacing, center_y - 2.0);
            self.particles.push(Particle::letter(from, target, ch, rng));
        }

        // confetti drops in from the top edge
        let pieces = (self.width as usize / 2).clamp(10, 60);
        for _ in 0..pieces {
            let x = rng.gen_range(0.0..self.width.max(1.0));
            let y = rng.gen_range(-3.0..1.0);
            self.particles.push(Particle::confetti(x, y, rng));
        }
    }

    pub fn stop(&mut self) {
        self.is_active = false;
        self.particles.clear();
    }

    pub fn update(&mut self, dt: Duration) {
        if !self.is_active {
            return;
        }

        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.stop();
            return;
        }

        let step = dt.as_secs_f64();
        let (width, height) = (self.width, self.height);
        self.particles.retain_mut(|p| {
            let alive = p.update(step);
            if p.is_text {
                return alive;
            }
            let margin = 5.0;
            let off_screen = p.y > height + margin || p.x < -margin || p.x > width + margin;
            alive && !off_screen
        });
    }
}

impl Default for Celebration {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const FRAME: Duration = Duration::from_millis(100);

    #[test]
    fn confetti_falls() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = Particle::confetti(10.0, 0.0, &mut rng);
        let vel_y = p.vel_y;

        assert!(p.update(0.1));
        assert!(p.y > 0.0);
        assert!(p.vel_y > vel_y);
    }

    #[test]
    fn letters_settle_on_target() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut p = Particle::letter((0.0, 0.0), (10.0, 5.0), 'M', &mut rng);

        for _ in 0..40 {
            p.update(0.1);
        }
        assert_eq!((p.x, p.y), (10.0, 5.0));
        assert_eq!(p.symbol, 'M');
    }

    #[test]
    fn start_spawns_greeting_and_confetti() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut c = Celebration::new();
        assert!(!c.is_active);

        c.start(80, 24, &mut rng);
        assert!(c.is_active);
        assert!(c.particles.iter().any(|p| p.is_text));
        assert!(c.particles.iter().any(|p| !p.is_text));
    }

    #[test]
    fn ends_after_duration() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut c = Celebration::new();
        c.start(80, 24, &mut rng);

        for _ in 0..10 {
            c.update(FRAME);
        }
        assert!(c.is_active);

        c.update(Duration::from_secs(5));
        assert!(!c.is_active);
        assert!(c.particles.is_empty());
    }

    #[test]
    fn off_screen_confetti_is_dropped() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut c = Celebration::new();
        c.start(20, 10, &mut rng);
        c.particles.push(Particle::confetti(100.0, 100.0, &mut rng));

        c.update(FRAME);
        assert!(c.particles.iter().all(|p| p.is_text || p.x <= 25.0));
    }

    #[test]
    fn inactive_update_is_noop() {
        let mut c = Celebration::default();
        c.update(FRAME);
        assert!(!c.is_active);
        assert!(c.particles.is_empty());
    }
}
