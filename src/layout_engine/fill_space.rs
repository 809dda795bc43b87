/// Bounds for one item handed to [`fill_space`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraint {
    pub min: i32,
    pub max: i32,
}

impl Constraint {
    pub const UNBOUNDED: Constraint = Constraint { min: 0, max: i32::MAX };

    pub fn new(min: i32, max: i32) -> Self { Self { min, max: max.max(min) } }

    pub fn at_least(min: i32) -> Self { Self::new(min, i32::MAX) }

    fn clamp(&self, value: i64) -> i64 { value.clamp(self.min as i64, self.max as i64) }
}

const MAX_ROUNDS: usize = 64;

/// Splits `budget` across `items`, keeping every value inside its bounds.
///
/// All items share one mean which is moved until the clamped values fill the
/// budget; the integer remainder then goes to the last items, one chunk per
/// pass. The result sums to `budget` whenever `sum(min) <= budget <=
/// sum(max)`, otherwise every item saturates at the bound nearest to it.
pub fn fill_space(budget: i32, items: &[Constraint]) -> Vec<i32> {
    if items.is_empty() {
        return Vec::new();
    }
    let budget = budget as i64;
    let mean = solve_mean(budget, items);
    let mut values: Vec<i64> = items.iter().map(|c| c.clamp(mean)).collect();
    distribute_remainder(budget, items, &mut values);
    values.into_iter().map(|v| v as i32).collect()
}

fn solve_mean(budget: i64, items: &[Constraint]) -> i64 {
    let mut mean = budget.div_euclid(items.len() as i64);
    for _ in 0..MAX_ROUNDS {
        let mut required = 0;
        let mut decreasable = 0;
        let mut increasable = 0;
        let mut low = i64::MIN;
        let mut high = i64::MAX;
        for item in items {
            let value = item.clamp(mean);
            required += value;
            if mean > item.min as i64 {
                decreasable += 1;
                low = low.max(value);
            }
            if mean < item.max as i64 {
                increasable += 1;
                high = high.min(value);
            }
        }

        let error = required - budget;
        let next = if error > 0 && decreasable > 0 {
            floor_div(low * decreasable - error, decreasable)
        } else if error < 0 && increasable > 0 {
            floor_div(high * increasable - error, increasable)
        } else {
            mean
        };
        if next == mean {
            break;
        }
        mean = next;
    }
    mean
}

fn floor_div(a: i64, b: i64) -> i64 { a.div_euclid(b) }

fn distribute_remainder(budget: i64, items: &[Constraint], values: &mut [i64]) {
    loop {
        let remainder = budget - values.iter().sum::<i64>();
        if remainder == 0 {
            return;
        }
        let open: Vec<usize> = (0..items.len())
            .rev()
            .filter(|&i| {
                if remainder > 0 {
                    values[i] < items[i].max as i64
                } else {
                    values[i] > items[i].min as i64
                }
            })
            .collect();
        if open.is_empty() {
            return;
        }
        let chunk = (remainder.abs() / open.len() as i64).max(1) * remainder.signum();
        let mut left = remainder;
        for i in open {
            if left == 0 {
                break;
            }
            let step = if remainder > 0 { chunk.min(left) } else { chunk.max(left) };
            let adjusted = items[i].clamp(values[i] + step);
            left -= adjusted - values[i];
            values[i] = adjusted;
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn unbounded_items_split_evenly() {
        assert_eq!(fill_space(90, &[Constraint::UNBOUNDED; 3]), vec![30, 30, 30]);
    }

    #[test]
    fn remainder_goes_to_later_items() {
        assert_eq!(fill_space(11, &[Constraint::UNBOUNDED; 3]), vec![3, 4, 4]);
        assert_eq!(fill_space(1000, &[Constraint::UNBOUNDED; 3]), vec![333, 333, 334]);
    }

    #[test]
    fn large_minimum_is_reserved_first() {
        let items = [Constraint::at_least(600), Constraint::at_least(40), Constraint::at_least(40)];
        assert_eq!(fill_space(1000, &items), vec![600, 200, 200]);
    }

    #[test]
    fn small_maximum_frees_space_for_others() {
        let items = [Constraint::new(0, 100), Constraint::UNBOUNDED, Constraint::UNBOUNDED];
        assert_eq!(fill_space(900, &items), vec![100, 400, 400]);
    }

    #[test]
    fn infeasible_budgets_saturate() {
        let items = [Constraint::new(50, 100), Constraint::new(50, 100)];
        assert_eq!(fill_space(20, &items), vec![50, 50]);
        assert_eq!(fill_space(500, &items), vec![100, 100]);
    }

    #[test]
    fn empty_input() {
        assert!(fill_space(100, &[]).is_empty());
    }

    #[test]
    fn feasible_budgets_sum_exactly() {
        let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
        let mut rand = |n: i32| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % n as u64) as i32
        };
        for _ in 0..300 {
            let n = 1 + rand(6) as usize;
            let items: Vec<Constraint> = (0..n)
                .map(|_| {
                    let min = rand(300);
                    if rand(3) == 0 {
                        Constraint::at_least(min)
                    } else {
                        Constraint::new(min, min + rand(500))
                    }
                })
                .collect();
            let lo: i64 = items.iter().map(|c| c.min as i64).sum();
            let hi: i64 = items.iter().map(|c| c.max as i64).sum::<i64>().min(5000);
            if lo > hi {
                continue;
            }
            let budget = (lo + rand((hi - lo + 1) as i32) as i64) as i32;
            let values = fill_space(budget, &items);
            assert_eq!(values.iter().map(|&v| v as i64).sum::<i64>(), budget as i64);
            for (value, item) in values.iter().zip(&items) {
                assert!(*value >= item.min && *value <= item.max, "{value} outside {item:?}");
            }
        }
    }
}
