//! Детерминированный генератор для воспроизводимых разбиений

use rand::RngCore;

/// Рекуррентный генератор: дробная часть `sin(s) * 10000`, `s` растет на 1 за выборку.
///
/// Живет только в пределах вызова, глобальный источник случайности не трогает.
#[derive(Debug, Clone)]
pub struct SineRng {
    state: i64,
}

impl SineRng {
    pub fn new(seed: i64) -> Self {
        Self { state: seed }
    }

    /// Следующее значение в [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        let x = (self.state as f64).sin() * 10000.0;
        self.state = self.state.wrapping_add(1);
        x - x.floor()
    }
}

impl RngCore for SineRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        // 53 бита мантиссы в старшие биты, чтобы gen::<f64>() вернул то же значение
        let mantissa = (self.next_f64() * (1u64 << 53) as f64) as u64;
        mantissa << 11
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
