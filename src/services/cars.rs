use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::{dataset::Table, models::car_listing::CarListing};

/// Seeded when `seed` is set, otherwise drawn from OS entropy.
pub fn sample_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Uniform random subset of `size` distinct rows, in random order. Returns
/// every row when the table is smaller than `size`.
pub fn sample_rows<'a, T, R>(table: &'a Table<T>, size: usize, rng: &mut R) -> Table<&'a T>
where
    R: Rng + ?Sized,
{
    let mut rows: Vec<(usize, &T)> = table
        .rows
        .choose_multiple(rng, size)
        .map(|(index, row)| (*index, row))
        .collect();
    rows.shuffle(rng);
    Table { rows }
}

/// Exact, case-sensitive match on `model_key`, in file order.
pub fn search_model_key<'a>(
    table: &'a Table<CarListing>,
    model_key: &str,
) -> Table<&'a CarListing> {
    Table {
        rows: table
            .rows
            .iter()
            .filter(|(_, car)| car.model_key == model_key)
            .map(|(index, car)| (*index, car))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(model_key: &str) -> CarListing {
        CarListing {
            model_key: model_key.to_string(),
            mileage: 50000.0,
            engine_power: 120.0,
            fuel: "diesel".to_string(),
            paint_color: "black".to_string(),
            car_type: "estate".to_string(),
            private_parking_available: true,
            has_gps: true,
            has_air_conditioning: false,
            automatic_car: false,
            has_getaround_connect: true,
            has_speed_regulator: true,
            winter_tires: true,
            rental_price_per_day: 120.0,
        }
    }

    fn table(keys: &[&str]) -> Table<CarListing> {
        Table {
            rows: keys
                .iter()
                .enumerate()
                .map(|(i, key)| (i * 10, car(key)))
                .collect(),
        }
    }

    #[test]
    fn sample_returns_five_distinct_rows() {
        let table = table(&["Audi", "BMW", "Ford", "Fiat", "Mini", "Opel", "SEAT", "Honda"]);
        let mut rng = sample_rng(None);

        let sample = sample_rows(&table, 5, &mut rng);

        assert_eq!(sample.len(), 5);
        for (index, row) in &sample.rows {
            assert!(table.rows.iter().any(|(i, r)| i == index && r == *row));
        }
    }

    #[test]
    fn seeded_sample_is_deterministic() {
        let table = table(&["Audi", "BMW", "Ford", "Fiat", "Mini", "Opel", "SEAT", "Honda"]);

        let first = sample_rows(&table, 5, &mut sample_rng(Some(3)));
        let second = sample_rows(&table, 5, &mut sample_rng(Some(3)));

        assert_eq!(first, second);
    }

    #[test]
    fn small_table_is_returned_whole() {
        let table = table(&["Audi", "BMW"]);
        let sample = sample_rows(&table, 5, &mut sample_rng(Some(1)));
        assert_eq!(sample.len(), 2);
    }

    #[test]
    fn sample_order_is_not_tied_to_row_index() {
        let keys: Vec<String> = (0..40).map(|i| format!("Car {i}")).collect();
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        let table = table(&keys);

        // a fixed sorted order would come back from every seed
        let unsorted = (0..20).any(|seed| {
            let sample = sample_rows(&table, 5, &mut sample_rng(Some(seed)));
            sample.rows.windows(2).any(|pair| pair[0].0 > pair[1].0)
        });
        assert!(unsorted);
    }

    #[test]
    fn sample_serializes_in_sampled_order() {
        let table = table(&["Audi", "BMW", "Ford", "Fiat", "Mini", "Opel", "SEAT", "Honda"]);
        let sample = sample_rows(&table, 5, &mut sample_rng(Some(9)));

        let json = serde_json::to_string(&sample).unwrap();

        let positions: Vec<usize> = sample
            .rows
            .iter()
            .map(|(index, _)| json.find(&format!("\"{index}\":{{")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn search_is_exact_and_case_sensitive() {
        let table = table(&["Peugeot", "peugeot", "Peugeot", "Peugeot 208"]);

        let found = search_model_key(&table, "Peugeot");

        let indices: Vec<usize> = found.rows.iter().map(|(index, _)| *index).collect();
        assert_eq!(indices, vec![0, 20]);
        assert!(found.iter().all(|car| car.model_key == "Peugeot"));
    }

    #[test]
    fn search_without_match_is_empty() {
        let table = table(&["Peugeot"]);
        assert!(search_model_key(&table, "Tesla").is_empty());
    }
}
