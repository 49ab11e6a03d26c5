//! Food catalog
//!
//! In-memory list of foods a user can log, seeded with a default set whose
//! values are per 100 g.

use crate::energy::GoalCategory;
use crate::errors::{NutritionError, NutritionResult};
use crate::models::{FoodCategory, FoodItem, NutrientBasis, Nutrients};
use crate::validation::validate_nutrient_amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Calorie ceiling (per 100 g) for foods recommended when losing weight
pub const LOW_CALORIE_MAX_KCAL: i64 = 200;
/// Protein floor (grams per 100 g) for foods recommended when gaining
pub const HIGH_PROTEIN_MIN_G: i64 = 15;

/// Input for adding a food to the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFoodItem {
    pub name: String,
    pub category: FoodCategory,
    pub description: Option<String>,
    #[serde(default)]
    pub basis: NutrientBasis,
    pub nutrients: Nutrients,
}

/// Catalog of loggable foods
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodCatalog {
    items: Vec<FoodItem>,
    next_id: u32,
}

impl FoodCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
        }
    }

    /// Catalog with the default foods
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        for seed in DEFAULT_FOODS {
            let [calories, protein, carbs, fat, fiber] = seed.per_100g;
            catalog.push(
                seed.name.to_string(),
                seed.category,
                Some(seed.description.to_string()),
                NutrientBasis::Per100g,
                Nutrients::new(calories, protein, carbs, fat, fiber),
            );
        }
        catalog
    }

    fn push(
        &mut self,
        name: String,
        category: FoodCategory,
        description: Option<String>,
        basis: NutrientBasis,
        nutrients: Nutrients,
    ) -> &FoodItem {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        self.items.push(FoodItem {
            id,
            name,
            category,
            description,
            active: true,
            basis,
            nutrients,
        });
        &self.items[self.items.len() - 1]
    }

    /// Add a food, assigning it the next id
    pub fn insert(&mut self, food: NewFoodItem) -> NutritionResult<&FoodItem> {
        let name = food.name.trim().to_string();
        if name.is_empty() {
            return Err(NutritionError::precondition("food_name", "Food name cannot be empty"));
        }
        for (field, value) in food.nutrients.fields() {
            validate_nutrient_amount(value).map_err(|message| NutritionError::precondition(field, message))?;
        }
        Ok(self.push(name, food.category, food.description, food.basis, food.nutrients))
    }

    /// Look up a food by id, including deactivated ones
    pub fn get(&self, id: u32) -> Option<&FoodItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Hide a food from listings; existing log entries keep their values
    ///
    /// Returns false when no food has that id.
    pub fn deactivate(&mut self, id: u32) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.active = false;
                true
            }
            None => false,
        }
    }

    pub fn active(&self) -> impl Iterator<Item = &FoodItem> {
        self.items.iter().filter(|item| item.active)
    }

    /// Case-insensitive substring search over active foods
    ///
    /// An empty query returns every active food.
    pub fn search(&self, query: &str) -> Vec<&FoodItem> {
        let needle = query.trim().to_lowercase();
        self.active()
            .filter(|item| needle.is_empty() || item.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn by_category(&self, category: FoodCategory) -> Vec<&FoodItem> {
        self.active().filter(|item| item.category == category).collect()
    }

    /// Active foods at or below `max_kcal`, lowest first
    pub fn low_calorie(&self, max_kcal: Decimal) -> Vec<&FoodItem> {
        let mut items: Vec<_> = self
            .active()
            .filter(|item| item.nutrients.calories <= max_kcal)
            .collect();
        items.sort_by(|a, b| a.nutrients.calories.cmp(&b.nutrients.calories));
        items
    }

    /// Active foods with at least `min_protein_g` protein, highest first
    pub fn high_protein(&self, min_protein_g: Decimal) -> Vec<&FoodItem> {
        let mut items: Vec<_> = self
            .active()
            .filter(|item| item.nutrients.protein_g >= min_protein_g)
            .collect();
        items.sort_by(|a, b| b.nutrients.protein_g.cmp(&a.nutrients.protein_g));
        items
    }

    /// Foods suited to a weight goal
    pub fn recommended_for(&self, goal: GoalCategory) -> Vec<&FoodItem> {
        match goal {
            GoalCategory::Lose => self.low_calorie(Decimal::from(LOW_CALORIE_MAX_KCAL)),
            GoalCategory::Gain => self.high_protein(Decimal::from(HIGH_PROTEIN_MIN_G)),
            GoalCategory::Maintain => self.active().collect(),
        }
    }

    /// Goal recommendations narrowed by a case-insensitive name search
    ///
    /// Keeps the recommendation order; an empty query keeps every food.
    pub fn search_recommended(&self, goal: GoalCategory, query: &str) -> Vec<&FoodItem> {
        let needle = query.trim().to_lowercase();
        self.recommended_for(goal)
            .into_iter()
            .filter(|item| needle.is_empty() || item.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

struct SeedFood {
    name: &'static str,
    description: &'static str,
    category: FoodCategory,
    /// kcal, protein, carbs, fat, fiber
    per_100g: [Decimal; 5],
}

const DEFAULT_FOODS: &[SeedFood] = &[
    SeedFood {
        name: "Grilled Chicken Breast",
        description: "Lean protein source",
        category: FoodCategory::Protein,
        per_100g: [Decimal::from_parts(165, 0, 0, false, 0), Decimal::from_parts(31, 0, 0, false, 0), Decimal::from_parts(0, 0, 0, false, 0), Decimal::from_parts(36, 0, 0, false, 1), Decimal::from_parts(0, 0, 0, false, 0)],
    },
    SeedFood {
        name: "Salmon Fillet",
        description: "Rich in omega-3 fatty acids",
        category: FoodCategory::Protein,
        per_100g: [Decimal::from_parts(208, 0, 0, false, 0), Decimal::from_parts(25, 0, 0, false, 0), Decimal::from_parts(0, 0, 0, false, 0), Decimal::from_parts(12, 0, 0, false, 0), Decimal::from_parts(0, 0, 0, false, 0)],
    },
    SeedFood {
        name: "Eggs",
        description: "Complete protein with all essential amino acids",
        category: FoodCategory::Protein,
        per_100g: [Decimal::from_parts(155, 0, 0, false, 0), Decimal::from_parts(13, 0, 0, false, 0), Decimal::from_parts(11, 0, 0, false, 1), Decimal::from_parts(11, 0, 0, false, 0), Decimal::from_parts(0, 0, 0, false, 0)],
    },
    SeedFood {
        name: "Greek Yogurt",
        description: "High protein dairy product",
        category: FoodCategory::Dairy,
        per_100g: [Decimal::from_parts(100, 0, 0, false, 0), Decimal::from_parts(17, 0, 0, false, 0), Decimal::from_parts(6, 0, 0, false, 0), Decimal::from_parts(4, 0, 0, false, 1), Decimal::from_parts(0, 0, 0, false, 0)],
    },
    SeedFood {
        name: "Brown Rice",
        description: "Whole grain complex carbohydrate",
        category: FoodCategory::Grain,
        per_100g: [Decimal::from_parts(111, 0, 0, false, 0), Decimal::from_parts(26, 0, 0, false, 1), Decimal::from_parts(23, 0, 0, false, 0), Decimal::from_parts(9, 0, 0, false, 1), Decimal::from_parts(18, 0, 0, false, 1)],
    },
    SeedFood {
        name: "Quinoa",
        description: "Complete protein grain",
        category: FoodCategory::Grain,
        per_100g: [Decimal::from_parts(120, 0, 0, false, 0), Decimal::from_parts(44, 0, 0, false, 1), Decimal::from_parts(22, 0, 0, false, 0), Decimal::from_parts(19, 0, 0, false, 1), Decimal::from_parts(28, 0, 0, false, 1)],
    },
    SeedFood {
        name: "Sweet Potato",
        description: "Nutritious complex carbohydrate",
        category: FoodCategory::Carbohydrate,
        per_100g: [Decimal::from_parts(86, 0, 0, false, 0), Decimal::from_parts(16, 0, 0, false, 1), Decimal::from_parts(20, 0, 0, false, 0), Decimal::from_parts(1, 0, 0, false, 1), Decimal::from_parts(30, 0, 0, false, 1)],
    },
    SeedFood {
        name: "Broccoli",
        description: "High in vitamins and fiber",
        category: FoodCategory::Vegetable,
        per_100g: [Decimal::from_parts(34, 0, 0, false, 0), Decimal::from_parts(28, 0, 0, false, 1), Decimal::from_parts(7, 0, 0, false, 0), Decimal::from_parts(4, 0, 0, false, 1), Decimal::from_parts(26, 0, 0, false, 1)],
    },
    SeedFood {
        name: "Spinach",
        description: "Iron-rich leafy green",
        category: FoodCategory::Vegetable,
        per_100g: [Decimal::from_parts(23, 0, 0, false, 0), Decimal::from_parts(29, 0, 0, false, 1), Decimal::from_parts(36, 0, 0, false, 1), Decimal::from_parts(4, 0, 0, false, 1), Decimal::from_parts(22, 0, 0, false, 1)],
    },
    SeedFood {
        name: "Avocado",
        description: "Healthy monounsaturated fats",
        category: FoodCategory::Fruit,
        per_100g: [Decimal::from_parts(160, 0, 0, false, 0), Decimal::from_parts(2, 0, 0, false, 0), Decimal::from_parts(9, 0, 0, false, 0), Decimal::from_parts(15, 0, 0, false, 0), Decimal::from_parts(67, 0, 0, false, 1)],
    },
    SeedFood {
        name: "Banana",
        description: "Natural energy source",
        category: FoodCategory::Fruit,
        per_100g: [Decimal::from_parts(89, 0, 0, false, 0), Decimal::from_parts(11, 0, 0, false, 1), Decimal::from_parts(23, 0, 0, false, 0), Decimal::from_parts(3, 0, 0, false, 1), Decimal::from_parts(26, 0, 0, false, 1)],
    },
    SeedFood {
        name: "Almonds",
        description: "Healthy fats and protein",
        category: FoodCategory::NutsSeeds,
        per_100g: [Decimal::from_parts(579, 0, 0, false, 0), Decimal::from_parts(21, 0, 0, false, 0), Decimal::from_parts(22, 0, 0, false, 0), Decimal::from_parts(50, 0, 0, false, 0), Decimal::from_parts(12, 0, 0, false, 0)],
    },
    SeedFood {
        name: "Chia Seeds",
        description: "High in omega-3 and fiber",
        category: FoodCategory::NutsSeeds,
        per_100g: [Decimal::from_parts(486, 0, 0, false, 0), Decimal::from_parts(17, 0, 0, false, 0), Decimal::from_parts(42, 0, 0, false, 0), Decimal::from_parts(31, 0, 0, false, 0), Decimal::from_parts(34, 0, 0, false, 0)],
    },
    SeedFood {
        name: "Oatmeal",
        description: "Fiber-rich breakfast option",
        category: FoodCategory::Grain,
        per_100g: [Decimal::from_parts(68, 0, 0, false, 0), Decimal::from_parts(24, 0, 0, false, 1), Decimal::from_parts(12, 0, 0, false, 0), Decimal::from_parts(14, 0, 0, false, 1), Decimal::from_parts(17, 0, 0, false, 1)],
    },
    SeedFood {
        name: "Apple",
        description: "Fiber-rich fruit",
        category: FoodCategory::Fruit,
        per_100g: [Decimal::from_parts(52, 0, 0, false, 0), Decimal::from_parts(3, 0, 0, false, 1), Decimal::from_parts(14, 0, 0, false, 0), Decimal::from_parts(2, 0, 0, false, 1), Decimal::from_parts(24, 0, 0, false, 1)],
    },
];
