use policyhub_core::pricing::{Tariff, TariffRepositoryTrait};
use policyhub_core::Result;

use crate::table::MemoryTable;

pub struct TariffRepository {
    tariffs: MemoryTable<Tariff>,
}

impl TariffRepository {
    pub fn new(tariffs: Vec<Tariff>) -> Result<Self> {
        let table = MemoryTable::new("Tariff");
        for tariff in tariffs {
            table.insert(&tariff.code.to_uppercase(), tariff)?;
        }
        Ok(TariffRepository { tariffs: table })
    }
}

impl TariffRepositoryTrait for TariffRepository {
    fn find_by_code(&self, code: &str) -> Result<Option<Tariff>> {
        self.tariffs.get(&code.to_uppercase())
    }

    fn get_all(&self) -> Result<Vec<Tariff>> {
        let mut tariffs = self.tariffs.all()?;
        tariffs.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(tariffs)
    }
}
