quantity!(KilowattHourRate, f64, "€/kWh");
