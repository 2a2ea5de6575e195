//! The compatibility wizard's step machine.
//!
//! Steps run in a fixed order:
//! `skinType → addAmProducts → addPmProducts → selectNewProductRoutine → selectNewProduct → results`.
//! Back-navigation follows a fixed reverse map, not a history stack.

use serde::{Deserialize, Serialize};

use skinfit_core::{Product, Routine, RoutineCollection, SkinType};

use crate::error::WizardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WizardStep {
    SkinType,
    AddAmProducts,
    AddPmProducts,
    SelectNewProductRoutine,
    SelectNewProduct,
    Results,
}

impl WizardStep {
    pub const ORDER: [WizardStep; 6] = [
        WizardStep::SkinType,
        WizardStep::AddAmProducts,
        WizardStep::AddPmProducts,
        WizardStep::SelectNewProductRoutine,
        WizardStep::SelectNewProduct,
        WizardStep::Results,
    ];

    /// The step a successful forward transition leads to.
    pub fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::SkinType => Some(WizardStep::AddAmProducts),
            WizardStep::AddAmProducts => Some(WizardStep::AddPmProducts),
            WizardStep::AddPmProducts => Some(WizardStep::SelectNewProductRoutine),
            WizardStep::SelectNewProductRoutine => Some(WizardStep::SelectNewProduct),
            WizardStep::SelectNewProduct => Some(WizardStep::Results),
            WizardStep::Results => None,
        }
    }

    /// Back target. `SkinType` has none.
    pub fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::SkinType => None,
            WizardStep::AddAmProducts => Some(WizardStep::SkinType),
            WizardStep::AddPmProducts => Some(WizardStep::AddAmProducts),
            WizardStep::SelectNewProductRoutine => Some(WizardStep::AddPmProducts),
            WizardStep::SelectNewProduct => Some(WizardStep::SelectNewProductRoutine),
            WizardStep::Results => Some(WizardStep::SelectNewProduct),
        }
    }

    /// Routine that selections are appended to on this step, if any.
    pub fn collecting_routine(self) -> Option<Routine> {
        match self {
            WizardStep::AddAmProducts => Some(Routine::Am),
            WizardStep::AddPmProducts => Some(Routine::Pm),
            _ => None,
        }
    }

    /// Steps that show the product search box.
    pub fn accepts_selection(self) -> bool {
        self.collecting_routine().is_some() || self == WizardStep::SelectNewProduct
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::SkinType => "skinType",
            WizardStep::AddAmProducts => "addAmProducts",
            WizardStep::AddPmProducts => "addPmProducts",
            WizardStep::SelectNewProductRoutine => "selectNewProductRoutine",
            WizardStep::SelectNewProduct => "selectNewProduct",
            WizardStep::Results => "results",
        }
    }
}

impl core::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an accepted product went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Routine(Routine),
    NewProduct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    step: WizardStep,
    skin_type: Option<SkinType>,
    am_products: RoutineCollection,
    pm_products: RoutineCollection,
    new_product: Option<Product>,
    new_product_routine: Option<Routine>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            step: WizardStep::SkinType,
            skin_type: None,
            am_products: RoutineCollection::new(),
            pm_products: RoutineCollection::new(),
            new_product: None,
            new_product_routine: None,
        }
    }
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn skin_type(&self) -> Option<&SkinType> {
        self.skin_type.as_ref()
    }

    pub fn am_products(&self) -> &RoutineCollection {
        &self.am_products
    }

    pub fn pm_products(&self) -> &RoutineCollection {
        &self.pm_products
    }

    pub fn routine(&self, routine: Routine) -> &RoutineCollection {
        match routine {
            Routine::Am => &self.am_products,
            Routine::Pm => &self.pm_products,
        }
    }

    fn routine_mut(&mut self, routine: Routine) -> &mut RoutineCollection {
        match routine {
            Routine::Am => &mut self.am_products,
            Routine::Pm => &mut self.pm_products,
        }
    }

    pub fn new_product(&self) -> Option<&Product> {
        self.new_product.as_ref()
    }

    pub fn new_product_routine(&self) -> Option<Routine> {
        self.new_product_routine
    }

    /// Existing products of the routine the new product is headed for.
    /// Anything but AM means PM.
    pub fn target_routine(&self) -> &RoutineCollection {
        match self.new_product_routine {
            Some(Routine::Am) => &self.am_products,
            _ => &self.pm_products,
        }
    }

    fn require_step(&self, action: &'static str, step: WizardStep) -> Result<(), WizardError> {
        if self.step == step {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                action,
                step: self.step,
            })
        }
    }

    pub fn choose_skin_type(&mut self, skin_type: SkinType) -> Result<(), WizardError> {
        self.require_step("choose skin type", WizardStep::SkinType)?;
        self.skin_type = Some(skin_type);
        Ok(())
    }

    pub fn choose_routine(&mut self, routine: Routine) -> Result<(), WizardError> {
        self.require_step("choose routine", WizardStep::SelectNewProductRoutine)?;
        self.new_product_routine = Some(routine);
        Ok(())
    }

    /// Generic "next". Advances only when the current step's guard holds;
    /// `selectNewProduct` advances through `accept_product` instead.
    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        match self.step {
            WizardStep::SkinType if self.skin_type.is_none() => {
                return Err(WizardError::MissingSkinType);
            }
            WizardStep::SelectNewProductRoutine if self.new_product_routine.is_none() => {
                return Err(WizardError::MissingRoutine);
            }
            WizardStep::SelectNewProduct => return Err(WizardError::SelectionRequired),
            _ => {}
        }

        let next = self.step.next().ok_or(WizardError::NoForwardStep(self.step))?;
        self.step = next;
        Ok(next)
    }

    /// Move to the back target. `None` (and no change) on `skinType`.
    pub fn back(&mut self) -> Option<WizardStep> {
        let previous = self.step.previous()?;
        self.step = previous;
        Some(previous)
    }

    /// Take a resolved product: append it to the routine being collected, or
    /// make it the new product and move to results.
    pub fn accept_product(&mut self, product: Product) -> Result<Placement, WizardError> {
        if let Some(routine) = self.step.collecting_routine() {
            self.routine_mut(routine).append(product);
            return Ok(Placement::Routine(routine));
        }

        self.require_step("select product", WizardStep::SelectNewProduct)?;
        self.new_product = Some(product);
        self.step = WizardStep::Results;
        Ok(Placement::NewProduct)
    }

    pub fn remove_product(&mut self, routine: Routine, index: usize) -> Option<Product> {
        self.routine_mut(routine).remove_at(index)
    }

    /// Back to `skinType` with everything cleared.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
